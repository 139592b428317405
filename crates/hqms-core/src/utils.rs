//! 通用工具函数

use crate::models::QueueType;

/// 生成叫号票据编码，前缀字母加补零到三位的序号
pub fn format_queue_code(queue_type: QueueType, queue_number: i32) -> String {
    format!("{}{:03}", queue_type.prefix(), queue_number)
}

/// 校验票据编码格式
pub fn is_valid_queue_code(code: &str) -> bool {
    let mut chars = code.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {
            let rest = chars.as_str();
            rest.len() >= 3 && rest.chars().all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_queue_code() {
        assert_eq!(format_queue_code(QueueType::Triage, 1), "T001");
        assert_eq!(format_queue_code(QueueType::Lab, 15), "L015");
        assert_eq!(format_queue_code(QueueType::Billing, 123), "B123");
        assert_eq!(format_queue_code(QueueType::Other, 7), "Q007");
    }

    #[test]
    fn test_is_valid_queue_code() {
        assert!(is_valid_queue_code("T001"));
        assert!(is_valid_queue_code("C042"));
        assert!(!is_valid_queue_code(""));
        assert!(!is_valid_queue_code("001"));
        assert!(!is_valid_queue_code("T01"));
        assert!(!is_valid_queue_code("t001"));
    }
}
