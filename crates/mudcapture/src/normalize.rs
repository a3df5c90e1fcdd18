//! 行正規化模組
//!
//! 移除終端控制序列與 CR，提供狀態機做判斷用的乾淨投影。
//! 無法辨識的片段原樣保留，不會回報錯誤。

const ESC: char = '\x1b';

/// 正規化一行：移除控制序列、CR，並去除前後空白
///
/// # Example
/// ```
/// use mudcapture::normalize::normalize_line;
///
/// assert_eq!(normalize_line("\x1b[1;32mTemple Square\x1b[0m\r"), "Temple Square");
/// ```
pub fn normalize_line(raw: &str) -> String {
    strip_controls(raw).trim().to_string()
}

/// 移除控制序列與 CR，但保留縮排
///
/// 分類器需要看到原始縮排，所以這裡不做 trim。
pub fn strip_controls(raw: &str) -> String {
    let mut current = strip_once(raw);
    // 移除一段序列後，相鄰的殘片可能拼成新的序列
    while current.contains(ESC) {
        let next = strip_once(&current);
        if next.len() == current.len() {
            break;
        }
        current = next;
    }
    current
}

fn strip_once(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut result = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\r' {
            i += 1;
            continue;
        }
        if c != ESC {
            result.push(c);
            i += 1;
            continue;
        }
        match escape_len(&chars[i..]) {
            Some(len) => i += len,
            None => {
                result.push(c);
                i += 1;
            }
        }
    }

    result
}

/// 計算從 ESC 開始的完整序列長度，無法辨識時返回 None
fn escape_len(seq: &[char]) -> Option<usize> {
    let next = *seq.get(1)?;
    match next {
        '[' => {
            // CSI：參數/中間位元組，直到 0x40..=0x7E 的結尾位元組
            for (offset, &ch) in seq.iter().enumerate().skip(2) {
                match ch {
                    '\x20'..='\x3f' => continue,
                    '\x40'..='\x7e' => return Some(offset + 1),
                    _ => return None,
                }
            }
            None
        }
        // 字元集指定 ESC ( B 之類
        '(' | ')' | '*' | '+' => {
            let designator = *seq.get(2)?;
            designator.is_ascii_graphic().then_some(3)
        }
        ch if ch.is_ascii_graphic() => Some(2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_color_codes() {
        assert_eq!(normalize_line("\x1b[1;31mHello\x1b[0m"), "Hello");
    }

    #[test]
    fn test_strip_carriage_return_and_trim() {
        assert_eq!(normalize_line("  You are standing.\r\n"), "You are standing.");
    }

    #[test]
    fn test_strip_charset_designator() {
        assert_eq!(normalize_line("\x1b(BObvious exits:"), "Obvious exits:");
    }

    #[test]
    fn test_strip_stray_escape() {
        assert_eq!(normalize_line("\x1b=A rat is here."), "A rat is here.");
    }

    #[test]
    fn test_unterminated_csi_passes_through() {
        let raw = "prompt \x1b[31";
        assert_eq!(normalize_line(raw), raw);
    }

    #[test]
    fn test_trailing_escape_passes_through() {
        assert_eq!(normalize_line("text\x1b"), "text\x1b");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "\x1b[32mA goblin is here.\x1b[0m",
            "\x1b\x1b[0m[31mnested",
            "\x1b\r[0mcr split",
            "plain line",
            "",
            "\x1b[",
        ];
        for input in inputs {
            let once = normalize_line(input);
            assert_eq!(normalize_line(&once), once, "輸入 {:?} 應為冪等", input);
        }
    }

    #[test]
    fn test_strip_controls_keeps_indent() {
        assert_eq!(strip_controls("   \x1b[33mA rat is here.\x1b[0m"), "   A rat is here.");
    }
}
