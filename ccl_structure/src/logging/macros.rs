//! Logging macros taking a `Code` plus `"key" => value` context pairs
//!
//! Context values may be any `Display` type.

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::log_error_with_context($code, $message, None, vec![])
    };

    ($code:expr, $message:expr, span = $span:expr) => {
        $crate::logging::log_error_with_context($code, $message, Some($span), vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_error_with_context($code, $message, None, context_refs)
        }
    };

    ($code:expr, $message:expr, span = $span:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_error_with_context($code, $message, Some($span), context_refs)
        }
    };
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::log_success_with_context($code, $message, vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_success_with_context($code, $message, context_refs)
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::log_info_with_context($message, vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_info_with_context($message, context_refs)
        }
    };
}

#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        $crate::logging::emit($crate::logging::LogEvent::warning($message))
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let mut event = $crate::logging::LogEvent::warning($message);
            $(
                event = event.with_context($key, &format!("{}", $value));
            )+
            $crate::logging::emit(event)
        }
    };
}

/// Debug events are built only when the configured level admits them
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            $crate::logging::emit($crate::logging::LogEvent::debug($message))
        }
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            let mut event = $crate::logging::LogEvent::debug($message);
            $(
                event = event.with_context($key, &format!("{}", $value));
            )+
            $crate::logging::emit(event)
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::codes;
    use crate::utils::Span;

    #[test]
    fn test_macros_are_silent_without_global_logger() {
        let level: u32 = 3;

        log_error!(codes::structure::ORPHANED_MEMBER, "Orphaned member",
            "level" => level,
            "member" => "name"
        );
        log_error!(
            codes::declaration::UNRECOGNIZED_ITEM,
            "Unexpected text",
            span = Span::from_offsets(0, 3)
        );
        log_success!(codes::success::STRUCTURE_BUILT, "Built", "members" => 4);
        log_info!("Scanning", "lines" => 12);
        log_warning!("Include left unresolved", "path" => "cclsource:x.inc");
        log_debug!("Item", "offset" => 17usize);
    }
}
