//! Operation logging macros
//!
//! Every macro emits one `tracing` event carrying `component`, `op` and
//! `event`; extra `field = value` pairs are passed through unchanged. The
//! macros expand to `()` so they can sit in statement or match-arm position.

#[doc(hidden)]
#[macro_export]
macro_rules! __histograph_op_event {
    ($level:ident, $op:expr, $event:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event,
            $($($field)*)?
        )
    };
}

/// `start` event of an operation
///
/// ```
/// # use histograph_core::log_op_start;
/// log_op_start!("create_commit");
/// log_op_start!("create_terminal_by_global_id", global_id = "Person/1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__histograph_op_event!(
            info,
            $op,
            $crate::core_types::schema::EVENT_START
            $(, $($field)*)?
        )
    };
}

/// `end` event of an operation; the duration is mandatory
///
/// ```
/// # use histograph_core::log_op_end;
/// log_op_end!("create_commit", duration_ms = 42, commit_id = "7.0");
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__histograph_op_event!(
            info,
            $op,
            $crate::core_types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// `end_error` event carrying the error kind, code and rendering
///
/// `$err` must be an `ExError` (or dereference to one).
///
/// ```
/// # use histograph_core::log_op_error;
/// # use histograph_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::ObjectNotFound);
/// log_op_error!("create_terminal", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: &$crate::errors::ExError = &$err;
        $crate::__histograph_op_event!(
            error,
            $op,
            $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            error = %ex_err
            $(, $($field)*)?
        );
    }};
}
