pub mod validate {
    /// 校验字符串去掉首尾空白后不为空，否则返回 `BotError::MissingField`
    #[macro_export]
    macro_rules! ensure_not_blank {
        ($value:expr, $field:expr) => {
            if $value.trim().is_empty() {
                return Err($crate::error::BotError::MissingField($field.to_string()));
            }
        };
    }

    /// 校验 Option 不为 None 且内容不为空白
    #[macro_export]
    macro_rules! ensure_some {
        ($option:expr, $($arg:tt)+) => {
            match $option {
                Some(v) if !v.trim().is_empty() => v,
                _ => return Err($crate::error::BotError::ConfigError(format!($($arg)+))),
            }
        };
    }
}
