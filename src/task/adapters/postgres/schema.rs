//! Diesel schema for task management persistence.

diesel::table! {
    /// Users referenced by tasks, comments and history.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Unique email address.
        #[max_length = 255]
        email -> Varchar,
        /// Authorization role.
        #[max_length = 20]
        role -> Varchar,
    }
}

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        title -> Text,
        /// Task description.
        description -> Text,
        /// Workflow status.
        #[max_length = 20]
        status -> Varchar,
        /// Optional assignee.
        assignee -> Nullable<Uuid>,
        /// Creator of the task.
        created_by -> Uuid,
        /// Most recent updater.
        updated_by -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Comments attached to tasks.
    comments (id) {
        /// Comment identifier.
        id -> Uuid,
        /// Parent task.
        task_id -> Uuid,
        /// Comment body.
        content -> Text,
        /// Author of the comment.
        created_by -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last edit timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only task audit records.
    task_histories (id) {
        /// Record identifier.
        id -> Uuid,
        /// Audited task.
        task_id -> Uuid,
        /// Actor that made the change.
        changed_by -> Uuid,
        /// Serialized `{field: {from, to}}` change set.
        changes -> Text,
        /// Time of the change.
        changed_at -> Timestamptz,
        /// Insertion sequence, orders records sharing a timestamp.
        seq -> Int8,
    }
}

diesel::joinable!(comments -> tasks (task_id));
diesel::joinable!(task_histories -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(users, tasks, comments, task_histories);
