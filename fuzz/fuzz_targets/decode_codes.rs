#![no_main]
use arcode::{BlockDecoder, CodeReader, ProbabilityModel, SegmentTable};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<u8>, String, u8, u16)| {
    let (sample, codes, block_size, text_len) = data;
    let Ok(model) = ProbabilityModel::from_bytes(&sample) else {
        return;
    };
    let table = SegmentTable::derive(&model).unwrap();
    let block_size = (block_size as usize % 16) + 1;
    let decoder = BlockDecoder::new(&table, block_size, text_len as usize).unwrap();

    // Arbitrary code text must decode or fail cleanly.
    let mut reader = CodeReader::new(codes.as_bytes());
    let mut out = Vec::new();
    if decoder.decode_stream(&mut reader, &mut out).is_ok() {
        assert_eq!(out.len(), text_len as usize);
    }
});
