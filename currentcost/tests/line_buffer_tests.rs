// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use currentcost::LineBuffer;

#[test]
fn test_lines_split_across_chunks_are_joined() {
    // Arrange
    let mut buffer = LineBuffer::new();

    // Act
    let first = buffer.push(b"<msg><src>CC");
    let second = buffer.push(b"128</src></msg>\r\n<msg>");

    // Assert
    assert!(first.is_empty());
    assert_eq!(second, vec![b"<msg><src>CC128</src></msg>".to_vec()]);
    assert_eq!(buffer.pending(), 5);
}

#[test]
fn test_several_lines_in_one_chunk_keep_order() {
    // Arrange
    let mut buffer = LineBuffer::new();

    // Act
    let lines = buffer.push(b"a\nb\r\n\nc\n");

    // Assert
    assert_eq!(lines, vec![b"a".to_vec(), b"b".to_vec(), Vec::new(), b"c".to_vec()]);
    assert_eq!(buffer.pending(), 0);
}

#[test]
fn test_overlong_line_is_discarded_until_next_delimiter() {
    // Arrange
    let mut buffer = LineBuffer::with_max_length(8);

    // Act
    let dropped = buffer.push(b"0123456");
    let resumed = buffer.push(b"789abc\nok\n");

    // Assert
    assert!(dropped.is_empty());
    assert_eq!(resumed, vec![b"ok".to_vec()]);
}

#[test]
fn test_clear_drops_partial_line() {
    // Arrange
    let mut buffer = LineBuffer::new();
    buffer.push(b"<msg><src>half");

    // Act
    buffer.clear();
    let lines = buffer.push(b"<msg></msg>\n");

    // Assert
    assert_eq!(lines, vec![b"<msg></msg>".to_vec()]);
}
