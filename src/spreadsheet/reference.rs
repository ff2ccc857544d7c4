/// Convert 0-based row & column indexes to an Excel-style cell position.
///
/// # Arguments
///
/// * `row` - The 0-based row index
/// * `column` - The 0-based column index
///
/// # Returns
///
/// * `String` - Excel-style cell position in upper case, e.g. `B7`
pub fn cell_position(row: usize, column: usize) -> String {
    let mut position = column_letters(column);
    position.push_str(&(row + 1).to_string());
    position
}

/// Convert a 0-based column index to its letters: 0 = A, 25 = Z, 26 = AA.
pub fn column_letters(column: usize) -> String {
    let mut column = column + 1;
    let mut letters = String::new();
    while column > 0 {
        column -= 1;
        letters.insert(0, (b'A' + (column % 26) as u8) as char);
        column /= 26;
    }
    letters
}
