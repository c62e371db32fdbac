//! 文本规范化与稳定键哈希
//!
//! 构建期提取器与运行期回填器共用同一份实现，保证同一段原文在两端得到完全相同的键。
//! 本模块不依赖任何第三方crate，也没有副作用。

use crate::api_constants::key_config::{HASH_SEED, KEY_PREFIX, NBSP};

/// 判断字符是否属于ECMAScript `\s` 空白类
///
/// 注意 U+0085 不在其中，而 U+FEFF 在其中，这与 `char::is_whitespace` 不同。
pub fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{000B}'
            | '\u{000C}'
            | '\r'
            | ' '
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// 规范化文本：不换行空格转普通空格，折叠连续空白，去掉首尾空白
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars().map(|c| if c == NBSP { ' ' } else { c }) {
        if is_js_whitespace(c) {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    out
}

/// 计算规范化文本的32位哈希
///
/// 按UTF-16码元折叠：`acc = ((acc << 5) + acc) ^ unit`，全部为32位回绕运算。
pub fn hash(text: &str) -> u32 {
    normalize(text)
        .encode_utf16()
        .fold(HASH_SEED, |acc, unit| {
            (acc << 5).wrapping_add(acc) ^ u32::from(unit)
        })
}

/// 生成字典键：固定前缀 + 小写十六进制（不补零）
pub fn hash_key(text: &str) -> String {
    format!("{}{:x}", KEY_PREFIX, hash(text))
}
