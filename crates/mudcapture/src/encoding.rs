//! 輸入編碼模組
//!
//! 重播紀錄檔可能是 UTF-8 或台灣 MUD 常見的 Big5，先解碼成字串再逐行餵入。

use encoding_rs::{BIG5, UTF_8};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 紀錄檔編碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEncoding {
    #[default]
    Utf8,
    Big5,
}

impl FromStr for LineEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "big5" => Ok(Self::Big5),
            other => Err(format!("不支援的編碼: {}", other)),
        }
    }
}

impl fmt::Display for LineEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => f.write_str("utf8"),
            Self::Big5 => f.write_str("big5"),
        }
    }
}

/// 解碼一行，無效字元會被替換為 U+FFFD
///
/// # Example
/// ```
/// use mudcapture::encoding::{decode_line, LineEncoding};
///
/// let big5_bytes = [0xa7, 0x41, 0xa6, 0x6e]; // "你好" in Big5
/// assert_eq!(decode_line(&big5_bytes, LineEncoding::Big5), "你好");
/// ```
pub fn decode_line(bytes: &[u8], encoding: LineEncoding) -> String {
    let codec = match encoding {
        LineEncoding::Utf8 => UTF_8,
        LineEncoding::Big5 => BIG5,
    };
    let (decoded, _, _) = codec.decode(bytes);
    decoded.into_owned()
}

/// 整份紀錄檔切行並解碼
///
/// 以 `\n` 切分，行尾的 `\r` 保留給正規化處理。
pub fn decode_transcript(bytes: &[u8], encoding: LineEncoding) -> Vec<String> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    body.split(|b| *b == b'\n')
        .map(|line| decode_line(line, encoding))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_big5_chinese() {
        let big5_bytes = [0xa7, 0x41, 0xa6, 0x6e];
        assert_eq!(decode_line(&big5_bytes, LineEncoding::Big5), "你好");
    }

    #[test]
    fn test_decode_big5_mixed() {
        let mixed: Vec<u8> = [b"Hi".as_slice(), &[0xa7, 0x41, 0xa6, 0x6e]].concat();
        assert_eq!(decode_line(&mixed, LineEncoding::Big5), "Hi你好");
    }

    #[test]
    fn test_decode_utf8_invalid_replaced() {
        let result = decode_line(&[b'o', b'k', 0xff], LineEncoding::Utf8);
        assert_eq!(result, "ok\u{FFFD}");
    }

    #[test]
    fn test_decode_transcript_lines() {
        let lines = decode_transcript(b"one\r\ntwo\n\nthree\n", LineEncoding::Utf8);
        assert_eq!(lines, vec!["one\r", "two", "", "three"]);
        assert!(decode_transcript(b"", LineEncoding::Utf8).is_empty());
    }

    #[test]
    fn test_parse_encoding_name() {
        assert_eq!("UTF-8".parse::<LineEncoding>(), Ok(LineEncoding::Utf8));
        assert_eq!("big5".parse::<LineEncoding>(), Ok(LineEncoding::Big5));
        assert!("latin1".parse::<LineEncoding>().is_err());
        assert_eq!(LineEncoding::Big5.to_string(), "big5");
    }
}
