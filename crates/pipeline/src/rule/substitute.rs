//! 위치 변수 치환
//!
//! 템플릿 안의 `$0`, `$1`, ... 를 메시지 토큰으로 바꿉니다.
//! 플레이스홀더는 `$` 뒤에 이어지는 숫자 전체이므로 `$10`의 `$1`이
//! 따로 치환되는 일은 없습니다. 치환된 토큰 텍스트는 다시 검사하지 않습니다.

/// 템플릿의 위치 변수를 토큰으로 치환합니다.
///
/// 범위를 벗어난 인덱스나 `$01`처럼 0으로 시작하는 인덱스는 그대로 남깁니다.
pub fn substitute<S: AsRef<str>>(template: &str, tokens: &[S]) -> String {
    if !template.contains('$') {
        return template.to_owned();
    }

    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }

        let digits_start = i + 1;
        let mut end = digits_start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }

        if let Some(token) = lookup(&template[digits_start..end], tokens) {
            out.push_str(&template[literal_start..i]);
            out.push_str(token);
            literal_start = end;
        }
        i = end.max(i + 1);
    }

    out.push_str(&template[literal_start..]);
    out
}

fn lookup<'a, S: AsRef<str>>(digits: &str, tokens: &'a [S]) -> Option<&'a str> {
    if digits.is_empty() || (digits.len() > 1 && digits.starts_with('0')) {
        return None;
    }
    let index: usize = digits.parse().ok()?;
    tokens.get(index).map(AsRef::as_ref)
}
