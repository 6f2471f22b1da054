use bitflags::bitflags;

bitflags! {
    /// Post-processing applied to a string once all variables are resolved.
    ///
    /// `NONE` and `VAR_NAME` are raw modes: no separator normalization happens in
    /// either. `VAR_NAME` always lowercases and is used to normalize lookup keys.
    #[derive(Default)]
    pub struct ParseFlags: u32 {
        const NONE = 0x00;
        const LOWERCASE = 0x01;
        const UPPERCASE = 0x02;
        const FORWARD_SLASH = 0x10;
        const BACK_SLASH = 0x20;
        const SINGLE_SLASH = 0x40;
        const VAR_NAME = 0x100;
    }
}

impl ParseFlags {
    /// Whether these flags leave separators untouched.
    pub fn is_raw(&self) -> bool {
        *self == ParseFlags::NONE || *self == ParseFlags::VAR_NAME
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

pub(crate) fn apply_flags(input: String, flags: ParseFlags) -> String {
    if flags.is_raw() {
        return if flags.contains(ParseFlags::VAR_NAME) {
            input.to_lowercase()
        } else {
            input
        };
    }

    let mut output = if flags.contains(ParseFlags::FORWARD_SLASH) {
        input.replace('\\', "/")
    } else if flags.contains(ParseFlags::BACK_SLASH) {
        input.replace('/', "\\")
    } else {
        input
    };

    if flags.contains(ParseFlags::SINGLE_SLASH) {
        let mut collapsed = String::with_capacity(output.len());
        for c in output.chars() {
            if is_separator(c) && collapsed.ends_with(is_separator) {
                continue;
            }
            collapsed.push(c);
        }
        output = collapsed;
    }

    if flags.intersects(ParseFlags::LOWERCASE | ParseFlags::VAR_NAME) {
        output.to_lowercase()
    } else if flags.contains(ParseFlags::UPPERCASE) {
        output.to_uppercase()
    } else {
        output
    }
}
