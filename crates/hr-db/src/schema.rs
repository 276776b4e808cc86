//! Schema bootstrap
//!
//! Every statement is idempotent so the server can run it on each start.

use sqlx::PgPool;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        employee_code TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        role TEXT NOT NULL DEFAULT 'employee' CHECK (role IN ('employee', 'admin')),
        department TEXT,
        position TEXT,
        profile_picture_url TEXT,
        two_factor_enabled BOOLEAN NOT NULL DEFAULT FALSE,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS complaints (
        id BIGSERIAL PRIMARY KEY,
        employee_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        subject TEXT NOT NULL,
        description TEXT NOT NULL,
        category TEXT NOT NULL,
        anonymous BOOLEAN NOT NULL DEFAULT FALSE,
        attachment_url TEXT,
        status TEXT NOT NULL DEFAULT 'Pending'
            CHECK (status IN ('Pending', 'In-Review', 'Resolved', 'Escalated')),
        admin_response TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS complaints_employee_id_idx ON complaints (employee_id)",
    r#"
    CREATE TABLE IF NOT EXISTS suggestions (
        id BIGSERIAL PRIMARY KEY,
        employee_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        category TEXT NOT NULL DEFAULT 'General',
        status TEXT NOT NULL DEFAULT 'Pending'
            CHECK (status IN ('Pending', 'Reviewed', 'Implemented', 'Rejected')),
        admin_feedback TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS budget_requests (
        id BIGSERIAL PRIMARY KEY,
        requested_by BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        department TEXT NOT NULL,
        title TEXT NOT NULL,
        amount DOUBLE PRECISION NOT NULL CHECK (amount > 0),
        justification TEXT NOT NULL,
        document_url TEXT NOT NULL CHECK (document_url ~* '^https?://\S+\.pdf$'),
        status TEXT NOT NULL DEFAULT 'Pending'
            CHECK (status IN ('Pending', 'Submitted', 'Approved', 'Rejected')),
        finance_reference TEXT,
        reviewer_note TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS announcements (
        id BIGSERIAL PRIMARY KEY,
        author_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        image_url TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS announcement_likes (
        announcement_id BIGINT NOT NULL REFERENCES announcements(id) ON DELETE CASCADE,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (announcement_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS announcement_comments (
        id BIGSERIAL PRIMARY KEY,
        announcement_id BIGINT NOT NULL REFERENCES announcements(id) ON DELETE CASCADE,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        content TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS messages (
        id BIGSERIAL PRIMARY KEY,
        sender_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        recipient_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        content TEXT NOT NULL,
        read_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CHECK (sender_id <> recipient_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS messages_recipient_id_idx ON messages (recipient_id, read_at)",
    r#"
    CREATE TABLE IF NOT EXISTS action_reports (
        id BIGSERIAL PRIMARY KEY,
        employee_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        complaint_id BIGINT REFERENCES complaints(id) ON DELETE SET NULL,
        reported_by BIGINT NOT NULL REFERENCES users(id),
        action_taken TEXT NOT NULL,
        remarks TEXT,
        violation_reference TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id BIGSERIAL PRIMARY KEY,
        employee_id TEXT NOT NULL,
        name TEXT NOT NULL,
        department TEXT,
        position TEXT,
        time_in TIMESTAMPTZ NOT NULL,
        time_out TIMESTAMPTZ,
        total_hours DOUBLE PRECISION,
        synced_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (employee_id, time_in)
    )
    "#,
];

/// Create every table and index that does not exist yet
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!(statements = STATEMENTS.len(), "Database schema verified");
    Ok(())
}
