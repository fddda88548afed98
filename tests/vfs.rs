mod common;

use std::io::Read;

use lumpfs::wad::directory_crc;
use lumpfs::{ContainerKind, ErrorKind, FsConfig, FsState, LumpGroup, VirtualFileSystem};

use common::{build_wad, build_zip, Fixture};

#[test]
fn lifecycle_gates_operations() {
    let mut fs = VirtualFileSystem::new(FsConfig::with_base_path("/nonexistent"));
    assert_eq!(fs.state(), FsState::Uninitialized);
    assert!(fs.add_file("doom.wad").is_err());
    assert!(fs.shutdown().is_err());

    fs.init().unwrap();
    assert!(fs.init().is_err());
    assert!(fs.end_startup().is_err());

    fs.begin_startup().unwrap();
    assert_eq!(fs.state(), FsState::LoadingStartup);
    fs.end_startup().unwrap();
    assert_eq!(fs.state(), FsState::SteadyState);

    fs.shutdown().unwrap();
    assert_eq!(fs.state(), FsState::ShuttingDown);
    assert!(fs.add_lump_mapping("PLAYPAL", "/palette.dat").is_err());
}

#[test]
fn reads_stored_zip_entry() {
    let mut fixture = Fixture::new();
    let pk3 = fixture.write("a.pk3", &build_zip(&[("foo.txt", b"hello")]));

    let id = fixture.fs.add_file(&pk3).unwrap();
    let container = fixture.fs.container(id).unwrap();
    assert_eq!(container.kind(), ContainerKind::Zip);
    assert_eq!(container.entries().len(), 1);

    let entry = container.entries().get(0).unwrap();
    assert_eq!(entry.path(), fixture.path("foo.txt"));
    assert_eq!(entry.size(), 5);

    let mut handle = fixture.fs.open_file("foo.txt", "rb").unwrap();
    assert_eq!(handle.container(), Some(id));
    assert_eq!(handle.read_all().unwrap(), b"hello");
    assert!(fixture.fs.access_file("foo.txt"));
    assert!(!fixture.fs.access_file("bar.txt"));
}

#[test]
fn archive_without_central_directory_fails_cleanly() {
    let mut fixture = Fixture::new();
    let bad = fixture.write("bad.pk3", &[0x55u8; 100]);

    let error = fixture.fs.add_file(&bad).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Format);
    assert_eq!(fixture.fs.loaded_file_count(), 0);
    assert_eq!(fixture.fs.lump_count(), 0);
    assert!(!fixture.fs.has_file_id(&bad));
}

#[test]
fn empty_wad_loads() {
    let mut fixture = Fixture::new();
    let wad = fixture.write("empty.wad", &build_wad(b"PWAD", &[]));

    let id = fixture.fs.add_file(&wad).unwrap();
    assert_eq!(fixture.fs.container(id).unwrap().entries().len(), 0);
    assert_eq!(fixture.fs.lump_count(), 0);
    assert_eq!(fixture.fs.loaded_file_count(), 1);
}

#[test]
fn later_files_override_earlier_ones() {
    let mut fixture = Fixture::new();
    let iwad = fixture.write("A.wad", &build_wad(b"IWAD", &[("X", b"from a"), ("Y", b"only a")]));
    let pk3  = fixture.write("B.pk3", &build_zip(&[("X", b"from b")]));

    let a = fixture.fs.add_file(&iwad).unwrap();
    fixture.fs.set_custom(a, false).unwrap();
    let b = fixture.fs.add_file(&pk3).unwrap();

    let lump = fixture.fs.lump_num_for_name("X").unwrap();
    assert_eq!(fixture.fs.lump(lump).unwrap().container(), b);
    assert_eq!(fixture.fs.read_lump(lump).unwrap(), b"from b");
    assert!(fixture.fs.lump_source_file(lump).unwrap().ends_with("/B.pk3"));

    let first = fixture.fs.find_first_lump("x").unwrap();
    assert_eq!(fixture.fs.lump(first).unwrap().container(), a);
    assert_eq!(fixture.fs.find_all_lumps("X"), [first, lump]);

    assert_eq!(fixture.fs.loaded_files_crc(), directory_crc(vec![("X", 6), ("Y", 6)]));
    assert_eq!(fixture.fs.iwad_file_name().unwrap(), "A.WAD");
    assert_eq!(fixture.fs.pwad_file_names(';'), "B.pk3;");
}

#[test]
fn unloading_restores_previous_state() {
    let mut fixture = Fixture::new();
    let a = fixture.write("a.wad", &build_wad(b"PWAD", &[("X", b"first"), ("Y", b"y")]));
    let b = fixture.write("b.wad", &build_wad(b"PWAD", &[("X", b"second")]));

    fixture.fs.add_file(&a).unwrap();
    let before: Vec<_> = fixture.fs.primary_index().iter().map(|entry| entry.path().to_owned()).collect();

    fixture.fs.add_file(&b).unwrap();
    let lump = fixture.fs.lump_num_for_name("X").unwrap();
    assert_eq!(fixture.fs.read_lump(lump).unwrap(), b"second");

    fixture.fs.remove_file(&b).unwrap();
    let after: Vec<_> = fixture.fs.primary_index().iter().map(|entry| entry.path().to_owned()).collect();
    assert_eq!(before, after);

    let lump = fixture.fs.lump_num_for_name("X").unwrap();
    assert_eq!(fixture.fs.read_lump(lump).unwrap(), b"first");
    assert!(!fixture.fs.has_file_id(&b));

    assert_eq!(fixture.fs.remove_file(&b).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn duplicate_loads_are_refused() {
    let mut fixture = Fixture::new();
    let wad = fixture.write("dup.wad", &build_wad(b"PWAD", &[("X", b"x")]));

    fixture.fs.add_file(&wad).unwrap();
    let error = fixture.fs.add_file("./sub/../dup.wad").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::DuplicateLoad);
    assert!(error.kind().is_recoverable());
    assert_eq!(fixture.fs.loaded_file_count(), 1);

    fixture.fs.index(&wad, true).unwrap();
    assert_eq!(fixture.fs.loaded_file_count(), 2);
    assert_eq!(fixture.fs.lump_count(), 2);
}

#[test]
fn file_identities_register_once() {
    let mut fixture = Fixture::new();
    fixture.write("notes.txt", b"notes");

    assert!(fixture.fs.check_file_id("notes.txt"));
    assert!(!fixture.fs.check_file_id("./notes.txt"));
    assert!(fixture.fs.has_file_id("notes.txt"));

    assert!(fixture.fs.release_file_id("notes.txt"));
    assert!(!fixture.fs.release_file_id("notes.txt"));
    assert!(fixture.fs.check_file_id("notes.txt"));

    assert!(!fixture.fs.check_file_id("missing.txt"));

    fixture.fs.reset_file_ids();
    assert!(fixture.fs.file_ids().is_empty());
}

#[test]
fn unloads_non_startup_files() {
    let mut fixture = Fixture::new();
    let iwad  = fixture.write("game.wad", &build_wad(b"IWAD", &[("MAP01", b"map")]));
    let addon = fixture.write("addon.wad", &build_wad(b"PWAD", &[("MAP01", b"new map")]));

    fixture.fs.begin_startup().unwrap();
    let game = fixture.fs.add_file(&iwad).unwrap();
    fixture.fs.end_startup().unwrap();
    assert!(fixture.fs.container(game).unwrap().is_startup());

    let addon = fixture.fs.add_file(&addon).unwrap();
    assert!(!fixture.fs.container(addon).unwrap().is_startup());

    assert_eq!(fixture.fs.unload_all_non_startup().unwrap(), 1);
    assert_eq!(fixture.fs.unload_all_non_startup().unwrap(), 0);
    assert_eq!(fixture.fs.loaded_file_count(), 1);
    assert!(fixture.fs.container(game).is_some());

    let lump = fixture.fs.lump_num_for_name("MAP01").unwrap();
    assert_eq!(fixture.fs.read_lump(lump).unwrap(), b"map");
}

#[test]
fn loads_gwa_companion() {
    let mut fixture = Fixture::new();
    let wad = fixture.write("e1.wad", &build_wad(b"PWAD", &[("E1M1", b"map")]));
    fixture.write("e1.gwa", &build_wad(b"PWAD", &[("GL_E1M1", b"nodes")]));

    fixture.fs.add_file(&wad).unwrap();
    assert_eq!(fixture.fs.loaded_file_count(), 2);
    assert!(fixture.fs.lump_num_for_name("GL_E1M1").is_some());
    assert_eq!(fixture.fs.pwad_file_names(','), "e1.wad,");

    fixture.fs.remove_file("e1.gwa").unwrap();
    assert!(fixture.fs.lump_num_for_name("GL_E1M1").is_none());
}

#[test]
fn tags_flats_and_sprites() {
    let mut fixture = Fixture::new();
    let wad = fixture.write("groups.wad", &build_wad(b"PWAD", &[
        ("FLOOR", b"outside"),
        ("FF_START", b""),
        ("FLOOR", b"flat"),
        ("F_END", b""),
        ("S_START", b""),
        ("TROOA1", b"sprite"),
        ("S_END", b""),
    ]));

    fixture.fs.add_file(&wad).unwrap();

    let flat = fixture.fs.find_last_in_group("FLOOR", LumpGroup::Flats).unwrap();
    assert_eq!(fixture.fs.read_lump(flat).unwrap(), b"flat");
    let plain = fixture.fs.find_last_in_group("FLOOR", LumpGroup::None).unwrap();
    assert_eq!(fixture.fs.read_lump(plain).unwrap(), b"outside");
    assert!(fixture.fs.find_last_in_group("TROOA1", LumpGroup::Sprites).is_some());
    assert!(fixture.fs.find_last_in_group("TROOA1", LumpGroup::Flats).is_none());
}

#[test]
fn lump_name_lookup_strips_extension() {
    let mut fixture = Fixture::new();
    let pk3 = fixture.write("res.pk3", &build_zip(&[("lumps/playpal.lmp", b"palette")]));
    fixture.fs.add_file(&pk3).unwrap();

    let lump = fixture.fs.lump_num_for_name("PLAYPAL").unwrap();
    assert_eq!(fixture.fs.lump_num_for_name("playpal.lmp"), Some(lump));
    assert_eq!(fixture.fs.read_lump(lump).unwrap(), b"palette");
    assert!(fixture.fs.lump_num_for_name("").is_none());
}

#[test]
fn reads_lump_sections() {
    let mut fixture = Fixture::new();
    let wad = fixture.write("data.wad", &build_wad(b"PWAD", &[("DATA", b"0123456789")]));
    fixture.fs.add_file(&wad).unwrap();

    let lump = fixture.fs.lump_num_for_name("DATA").unwrap();
    assert_eq!(fixture.fs.read_lump_section(lump, 2, 3).unwrap(), b"234");
    assert_eq!(fixture.fs.read_lump_section(lump, 8, 4).unwrap_err().kind(), ErrorKind::BoundsViolation);
    assert_eq!(fixture.fs.lump(99).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn directory_mappings_redirect_native_files() {
    let mut fixture = Fixture::new();
    fixture.write("native/music/title.txt", b"tune");

    assert!(fixture.fs.add_directory_mapping("native/music", "/virtual/music").unwrap());
    assert!(!fixture.fs.add_directory_mapping("NATIVE/MUSIC", "/virtual/sound").unwrap());
    assert_eq!(fixture.fs.mappings().path_mappings().len(), 1);

    let mut handle = fixture.fs.open_file("/virtual/sound/title.txt", "rb").unwrap();
    assert_eq!(handle.container(), None);
    assert_eq!(handle.read_all().unwrap(), b"tune");

    assert!(fixture.fs.open_file("/virtual/music/title.txt", "rb").is_err());

    fixture.fs.clear_path_mappings();
    assert!(!fixture.fs.access_file("/virtual/sound/title.txt"));
}

#[test]
fn lump_mappings_expose_lumps_as_paths() {
    let mut fixture = Fixture::new();
    let wad = fixture.write("music.wad", &build_wad(b"PWAD", &[("D_RUNNIN", b"mus data")]));
    fixture.fs.add_file(&wad).unwrap();

    assert!(fixture.fs.add_lump_mapping("D_RUNNIN", "/music/runnin.mus").unwrap());
    let mut handle = fixture.fs.open_file("/music/runnin.mus", "rb").unwrap();
    assert_eq!(handle.read_all().unwrap(), b"mus data");

    assert_eq!(fixture.fs.find_all_paths("/music/*.mus"), ["/music/runnin.mus"]);

    fixture.fs.clear_lump_mappings();
    assert!(!fixture.fs.access_file("/music/runnin.mus"));
}

#[test]
fn open_falls_back_to_lump_names() {
    let mut fixture = Fixture::new();
    let wad = fixture.write("lumps.wad", &build_wad(b"PWAD", &[("COLORMAP", b"colors")]));
    fixture.fs.add_file(&wad).unwrap();

    let mut handle = fixture.fs.open_file("COLORMAP", "rb").unwrap();
    assert_eq!(handle.read_all().unwrap(), b"colors");
    assert!(fixture.fs.open_file("COLORMAP", "rbf").is_err());
}

#[test]
fn tracks_open_files() {
    let mut fixture = Fixture::new();
    let pk3 = fixture.write("open.pk3", &build_zip(&[("a.txt", b"aaa"), ("b.txt", b"bbb")]));
    let id = fixture.fs.add_file(&pk3).unwrap();

    let a = fixture.fs.open_file("a.txt", "rb").unwrap();
    let lump = fixture.fs.lump_num_for_name("b.txt").unwrap();
    let mut b = fixture.fs.open_lump(lump).unwrap();
    assert_eq!(fixture.fs.open_file_count(), 2);

    assert!(fixture.fs.close(a));
    assert_eq!(fixture.fs.open_file_count(), 1);

    fixture.fs.remove_file(&pk3).unwrap();
    assert_eq!(fixture.fs.open_file_count(), 0);
    assert!(fixture.fs.container(id).is_none());

    let mut data = Vec::new();
    b.read_to_end(&mut data).unwrap();
    assert_eq!(data, b"bbb");
    assert!(!fixture.fs.close(b));
}

#[test]
fn dropped_handles_leave_the_open_file_list() {
    let mut fixture = Fixture::new();
    fixture.write("native.txt", b"native");

    for _ in 0..100 {
        let handle = fixture.fs.open_file("native.txt", "rb").unwrap();
        assert_eq!(fixture.fs.open_file_count(), 1);
        drop(handle);
    }
    assert_eq!(fixture.fs.open_file_count(), 0);

    let kept = fixture.fs.open_file("native.txt", "rb").unwrap();
    {
        let _scoped = fixture.fs.open_file("native.txt", "rb").unwrap();
        assert_eq!(fixture.fs.open_file_count(), 2);
    }
    assert_eq!(fixture.fs.open_file_count(), 1);
    assert!(fixture.fs.close(kept));
    assert_eq!(fixture.fs.open_file_count(), 0);
}

#[test]
fn zip_paths_must_match_exactly() {
    let mut fixture = Fixture::new();
    fixture.write("data/x", b"native");
    let pk3 = fixture.write("lumps.pk3", &build_zip(&[("data/x.lmp", b"zip lump")]));
    fixture.fs.add_file(&pk3).unwrap();

    let mut handle = fixture.fs.open_file("data/x", "rb").unwrap();
    assert_eq!(handle.container(), None);
    assert_eq!(handle.read_all().unwrap(), b"native");

    let mut handle = fixture.fs.open_file("data/x.lmp", "rb").unwrap();
    assert_eq!(handle.read_all().unwrap(), b"zip lump");

    assert!(fixture.fs.access_file("data/x"));
    assert!(!fixture.fs.access_file("data/y"));
    std::fs::remove_file(fixture.dir.path().join("data/x")).unwrap();
    assert!(!fixture.fs.access_file("data/x"));

    // lump names still find the entry without its extension
    let lump = fixture.fs.lump_num_for_name("x").unwrap();
    assert_eq!(fixture.fs.read_lump(lump).unwrap(), b"zip lump");
}

#[test]
fn writes_native_files() {
    use std::io::Write;

    let mut fixture = Fixture::new();
    let mut handle = fixture.fs.open_file("out.txt", "wb").unwrap();
    assert!(handle.is_writable());
    handle.write_all(b"saved").unwrap();
    fixture.fs.close(handle);

    assert_eq!(std::fs::read(fixture.dir.path().join("out.txt")).unwrap(), b"saved");
    assert!(fixture.fs.open_file("out.txt", "rw").is_err());
}

#[test]
fn loads_containers_nested_in_zip() {
    let mut fixture = Fixture::new();
    let inner = build_wad(b"PWAD", &[("INNER", b"nested")]);
    let pk3 = fixture.write("outer.pk3", &build_zip(&[("maps/inner.wad", &inner)]));

    let outer = fixture.fs.add_file(&pk3).unwrap();
    let nested = fixture.fs.add_file("maps/inner.wad").unwrap();
    assert_eq!(fixture.fs.container(nested).unwrap().parent(), Some(outer));

    let lump = fixture.fs.lump_num_for_name("INNER").unwrap();
    assert_eq!(fixture.fs.read_lump(lump).unwrap(), b"nested");

    fixture.fs.remove_file(&pk3).unwrap();
    assert_eq!(fixture.fs.loaded_file_count(), 0);
    assert_eq!(fixture.fs.lump_count(), 0);
    assert!(fixture.fs.file_ids().is_empty());
}

#[test]
fn plain_files_become_single_entries() {
    let mut fixture = Fixture::new();
    let path = fixture.write("readme.txt", b"plain text");

    let id = fixture.fs.add_file(&path).unwrap();
    assert_eq!(fixture.fs.container(id).unwrap().kind(), ContainerKind::PlainFile);

    let lump = fixture.fs.lump_num_for_name("readme.txt").unwrap();
    assert_eq!(fixture.fs.read_lump(lump).unwrap(), b"plain text");
}

#[test]
fn finds_paths_by_pattern() {
    let mut fixture = Fixture::new();
    let pk3 = fixture.write("pack.pk3", &build_zip(&[("doc/a.txt", b"a"), ("doc/b.dat", b"b")]));
    fixture.write("doc/c.txt", b"c");
    fixture.write("doc/d.txt", b"d");
    fixture.fs.add_file(&pk3).unwrap();

    let found = fixture.fs.find_all_paths("doc/*.txt");
    assert_eq!(found, [
        fixture.path("doc/a.txt"),
        fixture.path("doc/c.txt"),
        fixture.path("doc/d.txt"),
    ]);
    assert!(fixture.fs.find_all_paths("").is_empty());
}

#[test]
fn finds_loaded_files() {
    let mut fixture = Fixture::new();
    let a = fixture.write("a.wad", &build_wad(b"PWAD", &[]));
    let b = fixture.write("b.pk3", &build_zip(&[]));
    fixture.fs.add_file(&a).unwrap();
    fixture.fs.add_file(&b).unwrap();

    assert!(fixture.fs.find("A.WAD").is_some());
    assert!(fixture.fs.find("c.wad").is_none());

    let zips = fixture.fs.find_all(|container| container.kind() == ContainerKind::Zip);
    assert_eq!(zips.len(), 1);
    assert_eq!(zips[0].path(), b);

    let paths: Vec<_> = fixture.fs.loaded_files().map(|container| container.path().to_owned()).collect();
    assert_eq!(paths, [a, b]);
}

#[test]
fn checksum_needs_a_game_wad() {
    let mut fixture = Fixture::new();
    let wad = fixture.write("custom.wad", &build_wad(b"PWAD", &[("X", b"x")]));
    let id = fixture.fs.add_file(&wad).unwrap();

    assert_eq!(fixture.fs.loaded_files_crc(), 0);
    fixture.fs.set_custom(id, false).unwrap();
    assert_eq!(fixture.fs.loaded_files_crc(), directory_crc(vec![("X", 1)]));
}

#[test]
fn shutdown_clears_everything() {
    let mut fixture = Fixture::new();
    let wad = fixture.write("a.wad", &build_wad(b"PWAD", &[("X", b"x")]));
    fixture.fs.add_file(&wad).unwrap();
    fixture.fs.add_lump_mapping("X", "/x.dat").unwrap();
    let _handle = fixture.fs.open_file("/x.dat", "rb").unwrap();

    fixture.fs.shutdown().unwrap();
    assert_eq!(fixture.fs.loaded_file_count(), 0);
    assert_eq!(fixture.fs.lump_count(), 0);
    assert_eq!(fixture.fs.open_file_count(), 0);
    assert!(fixture.fs.file_ids().is_empty());
    assert!(fixture.fs.mappings().lump_mappings().is_empty());
}
