#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary ByteRun1 streams and IFF files must never panic
    let _ = zenilbm::byterun1::decompress(data);
    let _ = zenilbm::byterun1::decompress_row(data, 0, 40);

    if let Ok(file) = zenilbm::IlbmFile::parse(data) {
        let _ = file.planar();
        let limits = zenilbm::Limits {
            max_memory_bytes: Some(1 << 20),
            ..Default::default()
        };
        let _ = file.planar_with_limits(Some(&limits));
    }
    let _ = zenilbm::IlbmInfo::from_bytes(data);
});
