//! Excel-style cell references ("A1", "BC12") and 0-based indexes.

/// Converts a 0-based (row, col) pair to an Excel-style reference.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut letters = Vec::<char>::new();
    let mut col = col + 1;
    while col > 0 {
        col -= 1;
        letters.push((b'A' + (col % 26) as u8) as char);
        col /= 26;
    }
    letters.iter().rev().collect::<String>() + &(row + 1).to_string()
}

/// Converts column letters to a 0-based column index.
///
/// Returns `None` for anything but ASCII letters, and for references too
/// long to fit in `usize`.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.bytes().all(|byte| byte.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .bytes()
        .try_fold(0usize, |index, byte| {
            index.checked_mul(26)?.checked_add((byte - b'A') as usize + 1)
        })
        .map(|col| col - 1)
}

/// Converts a 1-based row number to a 0-based row index.
pub(crate) fn row_to_index(number: &str) -> Option<usize> {
    number.parse::<usize>().ok().filter(|row| *row > 0).map(|row| row - 1)
}

/// Converts an Excel-style reference to a 0-based (row, col) pair.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|character: char| character.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    Some((row_to_index(digits)?, col_to_index(letters)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_round_trip() {
        assert_eq!(index_to_reference(0, 0), "A1");
        assert_eq!(index_to_reference(9, 25), "Z10");
        assert_eq!(index_to_reference(1, 26), "AA2");
        assert_eq!(reference_to_index("A1"), Some((0, 0)));
        assert_eq!(reference_to_index("AA2"), Some((1, 26)));
        assert_eq!(reference_to_index("bc12"), Some((11, 54)));
    }

    #[test]
    fn invalid_references() {
        assert_eq!(reference_to_index("A"), None);
        assert_eq!(reference_to_index("12"), None);
        assert_eq!(reference_to_index("A0"), None);
        assert_eq!(col_to_index("A1"), None);
    }

    #[test]
    fn oversized_column_is_rejected() {
        assert_eq!(col_to_index(&"Z".repeat(20)), None);
        assert_eq!(reference_to_index(&format!("{}1", "Z".repeat(20))), None);
        assert_eq!(col_to_index("XFD"), Some(16383));
    }
}
