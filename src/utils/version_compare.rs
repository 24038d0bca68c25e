//! 版本比较工具模块
//! 按点分段逐段比较版本号（如 `131.0.6778.204`）
//! 比较前去除末尾全 0 段，段按整数比较，前缀段全部相等时段数少者较小

use std::cmp::Ordering;
use once_cell::sync::Lazy;
use regex::Regex;

/// 末尾全 0 段（`.0`、`.0.00` ...）
static TRAILING_ZERO_SEGMENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\.0+)+$"#).unwrap()
});

/// 版本比较工具类
pub struct VersionComparator;

impl VersionComparator {
    /// 比较两个点分版本号
    ///
    /// # 返回值
    /// - `Ordering::Greater`: `a` 高于 `b`
    /// - `Ordering::Equal`: 去除末尾 0 段后完全一致
    /// - `Ordering::Less`: `a` 低于 `b`
    ///
    /// 无法解析为整数的段视为不可比较，直接跳过
    pub fn compare(a: &str, b: &str) -> Ordering {
        let stripped_a = TRAILING_ZERO_SEGMENTS.replace(a, "");
        let stripped_b = TRAILING_ZERO_SEGMENTS.replace(b, "");
        let segments_a: Vec<&str> = stripped_a.split('.').collect();
        let segments_b: Vec<&str> = stripped_b.split('.').collect();

        for (seg_a, seg_b) in segments_a.iter().zip(segments_b.iter()) {
            let (Some(num_a), Some(num_b)) = (Self::parse_segment(seg_a), Self::parse_segment(seg_b)) else {
                continue;
            };
            match num_a.cmp(&num_b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }

        segments_a.len().cmp(&segments_b.len())
    }

    /// 解析段的前导整数部分（允许前导空白和符号，其后字符忽略）
    fn parse_segment(segment: &str) -> Option<i64> {
        let trimmed = segment.trim_start();
        let (negative, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let end = digits
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(idx, _)| idx)
            .unwrap_or(digits.len());
        if end == 0 {
            return None;
        }

        digits[..end]
            .parse::<i64>()
            .ok()
            .map(|n| if negative { -n } else { n })
    }
}

// 单元测试
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_versions() {
        assert_eq!(VersionComparator::compare("131.0.0.0", "131.0.0.0"), Ordering::Equal);
    }

    #[test]
    fn test_trailing_zero_segments_do_not_matter() {
        assert_eq!(VersionComparator::compare("131.0", "131.0.0.0"), Ordering::Equal);
        assert_eq!(VersionComparator::compare("131", "131.00.0"), Ordering::Equal);
    }

    #[test]
    fn test_greater_and_less() {
        assert_eq!(VersionComparator::compare("132.0.1.0", "131.0.6778.204"), Ordering::Greater);
        assert_eq!(VersionComparator::compare("131.0.0.0", "132.0.0.1"), Ordering::Less);
        assert_eq!(VersionComparator::compare("131.0.6778.205", "131.0.6778.204"), Ordering::Greater);
    }

    #[test]
    fn test_segments_compare_numerically() {
        // 测试场景：按整数而不是字典序比较
        assert_eq!(VersionComparator::compare("131.0.10", "131.0.9"), Ordering::Greater);
    }

    #[test]
    fn test_shorter_sequence_is_smaller_on_tie() {
        assert_eq!(VersionComparator::compare("131.0.6778", "131.0.6778.1"), Ordering::Less);
    }

    #[test]
    fn test_non_numeric_segment_is_skipped() {
        assert_eq!(VersionComparator::compare("131.beta.2", "131.x.2"), Ordering::Equal);
        assert_eq!(VersionComparator::compare("131.2rc", "131.1"), Ordering::Greater);
    }
}
