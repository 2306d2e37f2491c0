//! XML 1.0 name character classes, without the colon (NCName rules).

pub(crate) fn is_name_start(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | '_'
        | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

pub(crate) fn is_name_char(c: char) -> bool {
    is_name_start(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

/// Characters that may open a location step.
pub(crate) fn is_step_start(c: char) -> bool {
    is_name_start(c) || matches!(c, '*' | '.' | '@')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_classes() {
        assert!(is_name_start('a'));
        assert!(is_name_start('é'));
        assert!(is_name_start('日'));
        assert!(!is_name_start('1'));
        assert!(!is_name_start('-'));
        assert!(!is_name_start(':'));
        assert!(is_name_char('1'));
        assert!(is_name_char('-'));
        assert!(is_name_char('.'));
        assert!(!is_name_char(':'));
        assert!(!is_name_char('/'));
        assert!(!is_name_char(' '));
    }
}
