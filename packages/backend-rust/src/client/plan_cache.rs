use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::client::{ClientError, StudyPlanService};
use crate::models::{StudyPlan, StudyTask, TaskStatus};

/// Caches the active plan in front of a [`StudyPlanService`].
///
/// The cache is only ever emptied explicitly: by the mutating calls below or
/// by [`PlanCache::invalidate`]. A fetch that raced with an invalidation does
/// not repopulate the cache with its (possibly stale) result.
pub struct PlanCache<S> {
    service: S,
    // outer None: nothing cached; inner None: the user has no plan
    cached: Mutex<Option<Option<StudyPlan>>>,
    generation: AtomicU64,
}

impl<S: StudyPlanService> PlanCache<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            cached: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub async fn plan(&self) -> Result<Option<StudyPlan>, ClientError> {
        let hit = self.cached.lock().clone();
        if let Some(plan) = hit {
            return Ok(plan);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let plan = self.service.fetch_plan().await?;

        let mut cached = self.cached.lock();
        if self.generation.load(Ordering::Acquire) == generation {
            *cached = Some(plan.clone());
        }
        Ok(plan)
    }

    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        *self.cached.lock() = None;
    }

    pub fn is_cached(&self) -> bool {
        self.cached.lock().is_some()
    }

    pub async fn update_task_status(&self, task_id: &str, status: TaskStatus) -> Result<StudyTask, ClientError> {
        let result = self.service.update_task_status(task_id, status).await;
        self.invalidate();
        result
    }

    pub async fn record_study_time(&self, task_id: &str, seconds: u64) -> Result<StudyTask, ClientError> {
        let result = self.service.record_study_time(task_id, seconds).await;
        self.invalidate();
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::models::{StudyMaterial, TaskCadence};
    use prep_algo::LearningStyle;

    #[derive(Default)]
    struct CountingService {
        fetches: AtomicUsize,
    }

    fn task(id: &str) -> StudyTask {
        StudyTask {
            id: id.into(),
            cadence: TaskCadence::Daily,
            day_index: Some(1),
            week_index: None,
            title: "Day 1".into(),
            subject: None,
            material: StudyMaterial::AudioLesson,
            status: TaskStatus::Pending,
            time_spent_secs: 0,
        }
    }

    impl StudyPlanService for CountingService {
        async fn fetch_plan(&self) -> Result<Option<StudyPlan>, ClientError> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(Some(StudyPlan {
                id: format!("plan-{n}"),
                session_id: "s".into(),
                learning_style: LearningStyle::Auditory,
                tasks: vec![task("t1")],
                progress_percent: 0.0,
                created_at: String::new(),
                updated_at: String::new(),
            }))
        }

        async fn update_task_status(&self, task_id: &str, status: TaskStatus) -> Result<StudyTask, ClientError> {
            let mut t = task(task_id);
            t.status = status;
            Ok(t)
        }

        async fn record_study_time(&self, _task_id: &str, _seconds: u64) -> Result<StudyTask, ClientError> {
            Err(ClientError::Network("offline".into()))
        }
    }

    #[tokio::test]
    async fn test_cache_hits_until_invalidated() {
        let cache = PlanCache::new(CountingService::default());
        assert_eq!(cache.plan().await.unwrap().unwrap().id, "plan-0");
        assert_eq!(cache.plan().await.unwrap().unwrap().id, "plan-0");
        assert_eq!(cache.service().fetches.load(Ordering::SeqCst), 1);

        cache.invalidate();
        assert!(!cache.is_cached());
        assert_eq!(cache.plan().await.unwrap().unwrap().id, "plan-1");
    }

    #[tokio::test]
    async fn test_mutations_invalidate_even_on_error() {
        let cache = PlanCache::new(CountingService::default());
        cache.plan().await.unwrap();

        cache.update_task_status("t1", TaskStatus::Completed).await.unwrap();
        assert!(!cache.is_cached());

        cache.plan().await.unwrap();
        assert!(cache.record_study_time("t1", 60).await.is_err());
        assert!(!cache.is_cached());
    }
}
