//! Table column planning.
//!
//! Column widths are percentages of the printable width and depend only on
//! the column count. The four-column split matches the classic receipt line
//! layout (item name wide, quantity narrow, unit price and total equal).

/// Width of each column as a percentage of the table width.
///
/// - 4 columns: 42 / 14 / 22 / 22 (item, qty, price, total)
/// - 2 columns: 50 / 50
/// - otherwise: `floor(100 / n)` each
pub fn widths(count: usize) -> Vec<u32> {
    match count {
        0 => Vec::new(),
        4 => vec![42, 14, 22, 22],
        2 => vec![50, 50],
        n => vec![(100 / n) as u32; n],
    }
}

/// Split a character budget across columns proportionally to [`widths`].
///
/// Used by the command-stream backend, where layout is in monospace cells
/// rather than percentages. The last column absorbs rounding leftovers so
/// the row always fills the full line.
pub fn char_widths(count: usize, chars_per_line: usize) -> Vec<usize> {
    let pct = widths(count);
    if pct.is_empty() {
        return Vec::new();
    }
    let mut cells: Vec<usize> = pct
        .iter()
        .map(|p| (chars_per_line * *p as usize) / 100)
        .collect();
    let used: usize = cells.iter().sum();
    if let Some(last) = cells.last_mut() {
        *last += chars_per_line.saturating_sub(used);
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_four_column_receipt_layout() {
        assert_eq!(widths(4), vec![42, 14, 22, 22]);
    }

    #[test]
    fn test_two_column_even_split() {
        assert_eq!(widths(2), vec![50, 50]);
    }

    #[test]
    fn test_generic_split() {
        assert_eq!(widths(3), vec![33, 33, 33]);
        assert_eq!(widths(5), vec![20, 20, 20, 20, 20]);
        assert_eq!(widths(1), vec![100]);
    }

    #[test]
    fn test_zero_columns() {
        assert!(widths(0).is_empty());
    }

    #[test]
    fn test_char_widths_fill_line() {
        let cells = char_widths(4, 48);
        assert_eq!(cells.iter().sum::<usize>(), 48);
        assert_eq!(cells[0], 20); // 42% of 48
        let cells = char_widths(3, 32);
        assert_eq!(cells.iter().sum::<usize>(), 32);
    }
}
