pub const SCHEMA_VERSION: &str = "1.1.0";

/// Columns added after their table first shipped, as (table, column, type).
/// `CREATE TABLE IF NOT EXISTS` leaves older tables untouched.
pub const ADDED_COLUMNS: &[(&str, &str, &str)] =
    &[("diagnostic_sessions", "gradedAnswersHash", "TEXT")];

pub const SCHEMA_SQL: &str = r#"
-- bookkeeping
CREATE TABLE IF NOT EXISTS "_db_metadata" (
    "key" TEXT PRIMARY KEY,
    "value" TEXT NOT NULL
);

-- question bank, correctOption is the answer key and never leaves the server
CREATE TABLE IF NOT EXISTS "diagnostic_questions" (
    "id" TEXT PRIMARY KEY,
    "questionSet" TEXT NOT NULL,
    "position" INTEGER NOT NULL,
    "prompt" TEXT NOT NULL,
    "options" TEXT NOT NULL,
    "subject" TEXT NOT NULL,
    "format" TEXT NOT NULL,
    "mediaRef" TEXT,
    "correctOption" INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS "idx_diagnostic_questions_set"
    ON "diagnostic_questions" ("questionSet", "position");

CREATE TABLE IF NOT EXISTS "diagnostic_sessions" (
    "id" TEXT PRIMARY KEY,
    "userId" TEXT NOT NULL,
    "questionSet" TEXT NOT NULL,
    "status" TEXT NOT NULL DEFAULT 'IN_PROGRESS',
    "createdAt" TEXT NOT NULL,
    "submittedAt" TEXT,
    "gradedAnswersHash" TEXT
);

CREATE INDEX IF NOT EXISTS "idx_diagnostic_sessions_user"
    ON "diagnostic_sessions" ("userId");

-- one row per session, payloadHash backs idempotent resubmission
CREATE TABLE IF NOT EXISTS "diagnostic_submissions" (
    "sessionId" TEXT PRIMARY KEY,
    "userId" TEXT NOT NULL,
    "payloadHash" TEXT NOT NULL,
    "learningStyle" TEXT NOT NULL,
    "planId" TEXT NOT NULL,
    "subjectBreakdown" TEXT NOT NULL,
    "createdAt" TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS "study_plans" (
    "id" TEXT PRIMARY KEY,
    "userId" TEXT NOT NULL,
    "sessionId" TEXT NOT NULL,
    "learningStyle" TEXT NOT NULL,
    "isActive" INTEGER NOT NULL DEFAULT 1,
    "createdAt" TEXT NOT NULL,
    "updatedAt" TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS "idx_study_plans_user"
    ON "study_plans" ("userId", "isActive");

CREATE TABLE IF NOT EXISTS "study_tasks" (
    "id" TEXT PRIMARY KEY,
    "planId" TEXT NOT NULL,
    "cadence" TEXT NOT NULL,
    "dayIndex" INTEGER,
    "weekIndex" INTEGER,
    "position" INTEGER NOT NULL,
    "title" TEXT NOT NULL,
    "subject" TEXT,
    "material" TEXT NOT NULL,
    "status" TEXT NOT NULL DEFAULT 'PENDING',
    "timeSpentSecs" INTEGER NOT NULL DEFAULT 0,
    "updatedAt" TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS "idx_study_tasks_plan"
    ON "study_tasks" ("planId", "position");

CREATE TABLE IF NOT EXISTS "learning_profiles" (
    "userId" TEXT PRIMARY KEY,
    "learningStyle" TEXT NOT NULL,
    "source" TEXT NOT NULL,
    "updatedAt" TEXT NOT NULL
);
"#;

/// Split a script on `;`, ignoring semicolons inside quotes.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    for ch in sql.chars() {
        match ch {
            '\'' if !in_double_quote => in_single_quote = !in_single_quote,
            '"' if !in_single_quote => in_double_quote = !in_double_quote,
            ';' if !in_single_quote && !in_double_quote => {
                push_statement(&mut statements, &current);
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    push_statement(&mut statements, &current);

    statements
}

fn push_statement(statements: &mut Vec<String>, raw: &str) {
    let sql = raw
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");
    let trimmed = sql.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ignores_quoted_semicolons() {
        let sql = "INSERT INTO t VALUES ('a;b'); SELECT \"x;y\" FROM t;";
        let statements = split_sql_statements(sql);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0], "INSERT INTO t VALUES ('a;b')");
    }

    #[test]
    fn test_split_drops_comment_lines() {
        let statements = split_sql_statements("-- header\nCREATE TABLE a (x INTEGER);\n-- only comment;");
        assert_eq!(statements, vec!["CREATE TABLE a (x INTEGER)".to_string()]);
    }

    #[test]
    fn test_schema_has_every_table() {
        let statements = split_sql_statements(SCHEMA_SQL);
        for table in [
            "_db_metadata",
            "diagnostic_questions",
            "diagnostic_sessions",
            "diagnostic_submissions",
            "study_plans",
            "study_tasks",
            "learning_profiles",
        ] {
            let needle = format!("CREATE TABLE IF NOT EXISTS \"{table}\"");
            assert!(
                statements.iter().any(|s| s.contains(&needle)),
                "missing table {table}"
            );
        }
    }
}
