use alloc::vec::Vec;

mod roundtrip;

/// Splits an encoded file into `(marker, segment data)` up to and including SOS,
/// followed by the entropy coded data between SOS and EOI
pub(crate) fn split_segments(data: &[u8]) -> (Vec<(u8, Vec<u8>)>, Vec<u8>) {
    assert_eq!(&data[..2], &[0xFF, 0xD8], "Missing SOI");
    assert_eq!(&data[data.len() - 2..], &[0xFF, 0xD9], "Missing EOI");

    let mut segments = Vec::new();
    let mut pos = 2;

    loop {
        assert_eq!(data[pos], 0xFF, "Expected marker at {}", pos);
        let marker = data[pos + 1];
        let length = usize::from(u16::from_be_bytes([data[pos + 2], data[pos + 3]]));

        segments.push((marker, data[pos + 4..pos + 2 + length].to_vec()));
        pos += 2 + length;

        if marker == 0xDA {
            break;
        }
    }

    (segments, data[pos..data.len() - 2].to_vec())
}
