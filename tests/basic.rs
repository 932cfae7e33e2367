//! Basic integration tests for mapped-region.

use mapped_region::{page_size, MapError, MapOptions, MappedRegion};
use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;

const MIB: usize = 1024 * 1024;

fn tmp_path(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("mapped_region_test_{}_{}", name, std::process::id()));
    p
}

fn write_pattern(name: &str, len: usize) -> (PathBuf, Vec<u8>) {
    let path = tmp_path(name);
    let bytes: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    fs::write(&path, &bytes).expect("write pattern");
    (path, bytes)
}

#[test]
fn aligned_offset_has_no_adjustment() {
    let (path, bytes) = write_pattern("aligned_offset", MIB);
    let file = File::open(&path).expect("open ro");
    let page = page_size().expect("page size");

    let mut region = MappedRegion::new();
    region
        .create(Some("aligned"), &file, page as u64, 100, true)
        .expect("create");

    assert_eq!(region.page_adjust(), 0);
    assert_eq!(region.base_len(), 100);
    assert_eq!(region.base_ptr(), region.data_ptr());
    assert_eq!(region.data().expect("data"), &bytes[page..page + 100]);

    drop(region);
    drop(file);
    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn unaligned_offset_is_pulled_back_to_page_start() {
    let (path, bytes) = write_pattern("unaligned_offset", MIB);
    let file = File::open(&path).expect("open ro");
    let page = page_size().expect("page size");
    let offset = page + 4;

    let mut region = MappedRegion::new();
    region
        .create(None, &file, offset as u64, 50, true)
        .expect("create");

    assert_eq!(region.page_adjust(), 4);
    assert_eq!(region.base_len(), 54);
    assert_eq!(region.data_ptr() as usize, region.base_ptr() as usize + 4);
    assert_eq!(region.data_offset(), offset as u64);
    assert_eq!(region.data_len(), 50);
    assert_eq!(region.data().expect("data"), &bytes[offset..offset + 50]);

    drop(region);
    drop(file);
    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn physical_length_tracks_adjustment_for_many_ranges() {
    let (path, bytes) = write_pattern("many_ranges", MIB);
    let file = File::open(&path).expect("open ro");
    let page = page_size().expect("page size");

    let ranges = [
        (0usize, 1usize),
        (1, 1),
        (page - 1, 2),
        (page, page),
        (3 * page + 17, 5000),
        (MIB - 10, 10),
        (12_345, 65_536),
    ];
    for (offset, len) in ranges {
        let mut region = MappedRegion::new();
        region
            .create(None, &file, offset as u64, len, true)
            .expect("create");

        let adjust = offset % page;
        assert_eq!(region.page_adjust(), adjust, "offset {offset}");
        assert_eq!(region.base_len(), len + adjust, "offset {offset}");
        assert_eq!(
            region.base_ptr() as usize + adjust,
            region.data_ptr() as usize
        );
        assert_eq!(region.data().expect("data"), &bytes[offset..offset + len]);
    }

    drop(file);
    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn zero_length_is_rejected() {
    let (path, _) = write_pattern("zero_length", 4096);
    let file = File::open(&path).expect("open ro");

    let mut region = MappedRegion::new();
    let err = region.create(None, &file, 0, 0, true).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid length: Length must be greater than zero"
    );
    assert!(!region.is_mapped());

    drop(file);
    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn range_past_end_of_file_is_rejected() {
    let (path, _) = write_pattern("past_eof", 1024);
    let file = File::open(&path).expect("open ro");

    let mut region = MappedRegion::new();
    let err = region.create(None, &file, 1000, 100, true).unwrap_err();
    assert_eq!(
        err.to_string(),
        "range out of bounds: offset=1000, len=100, total=1024"
    );
    assert!(!region.is_mapped());
    assert!(region.base_ptr().is_null());

    drop(file);
    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn writable_mapping_of_read_only_file_fails_cleanly() {
    let (path, _) = write_pattern("rw_on_ro", 8192);
    let file = File::open(&path).expect("open ro");

    let mut region = MappedRegion::new();
    let result = region.create(Some("rw_on_ro"), &file, 10, 10, false);
    assert!(matches!(result, Err(MapError::MapFailed { .. })));
    assert!(!region.is_mapped());
    assert_eq!(region.name(), None);

    // The same region can still be used afterwards.
    region.create(None, &file, 10, 10, true).expect("retry ro");
    assert!(region.is_mapped());

    drop(region);
    drop(file);
    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn mapping_outlives_the_file_handle() {
    let (path, bytes) = write_pattern("outlives_handle", 16 * 1024);
    let file = File::open(&path).expect("open ro");

    let region = MapOptions::new()
        .offset(9000)
        .len(300)
        .map(&file)
        .expect("map");
    drop(file);

    assert_eq!(region.data().expect("data"), &bytes[9000..9300]);

    drop(region);
    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn writes_are_shared_with_other_mappers() {
    let path = tmp_path("shared_writes");
    fs::write(&path, vec![0u8; 3 * 4096]).expect("write");
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&path)
        .expect("open rw");

    let mut writer = MapOptions::new()
        .offset(5000)
        .len(8)
        .read_only(false)
        .map(&file)
        .expect("map writer");
    let reader = MapOptions::new()
        .offset(4990)
        .len(30)
        .map(&file)
        .expect("map reader");

    writer
        .data_mut()
        .expect("data_mut")
        .copy_from_slice(b"SHAREDOK");
    assert_eq!(&reader.data().expect("data")[10..18], b"SHAREDOK");

    drop(writer);
    drop(reader);
    drop(file);
    let on_disk = fs::read(&path).expect("read back");
    assert_eq!(&on_disk[5000..5008], b"SHAREDOK");

    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn concurrent_readers() {
    use std::sync::Arc;
    use std::thread;

    let (path, bytes) = write_pattern("concurrent_readers", 256 * 1024);
    let file = File::open(&path).expect("open ro");
    let region = Arc::new(
        MapOptions::new()
            .offset(777)
            .len(200_000)
            .map(&file)
            .expect("map"),
    );
    let expected = Arc::new(bytes[777..200_777].to_vec());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let region = Arc::clone(&region);
            let expected = Arc::clone(&expected);
            thread::spawn(move || {
                assert_eq!(region.data().expect("data"), expected.as_slice());
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("reader thread");
    }

    drop(region);
    drop(file);
    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn unlinked_temp_file_maps_like_any_other() {
    use std::io::Write;

    let mut file = tempfile::tempfile().expect("tempfile");
    file.write_all(&[0xEE; 10_000]).expect("fill");
    file.flush().expect("flush");

    let region = MapOptions::new()
        .name("anonymous")
        .offset(4097)
        .map(&file)
        .expect("map");
    assert_eq!(region.data_len(), 10_000 - 4097);
    assert!(region.data().expect("data").iter().all(|&b| b == 0xEE));
}

#[test]
#[cfg(target_os = "linux")]
fn character_device_maps_without_size() {
    let file = File::open("/dev/zero").expect("open /dev/zero");
    let page = page_size().expect("page size");

    let mut region = MappedRegion::new();
    region
        .create(Some("/dev/zero"), &file, page as u64 + 9, 4096, true)
        .expect("create");

    assert_eq!(region.page_adjust(), 9);
    assert_eq!(region.base_len(), 4096 + 9);
    assert!(region.data().expect("data").iter().all(|&b| b == 0));
}
