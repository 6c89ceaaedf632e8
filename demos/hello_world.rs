use std::fs::File;
use std::io::Write;

use vfs_handle::{FileBackend, FileKind, Files, FilesConfig, Handle};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let tmp = std::env::temp_dir().join("vfs_handle_demo");
    std::fs::create_dir_all(&tmp)?;
    println!("Temp dir: {}", tmp.display());

    // an archive with one explicit directory; `docs/guide/` is never listed
    let mut writer = ZipWriter::new(File::create(tmp.join("hello.zip"))?);
    writer.add_directory("greetings/", SimpleFileOptions::default())?;
    writer.start_file("greetings/hello.txt", SimpleFileOptions::default())?;
    writer.write_all(b"Hello")?;
    writer.start_file("docs/guide/world.txt", SimpleFileOptions::default())?;
    writer.write_all(b"World")?;
    writer.finish()?;

    let files = Files::new(FilesConfig::rooted_at(&tmp));
    let root = files.archive("hello.zip", FileKind::Local)?;
    print_tree(&root, 0)?;

    let hello = root.child("greetings").child("hello.txt").read_string()?;
    // `docs/` and `docs/guide/` were synthesized while opening
    let world = root.child("docs/guide/world.txt").read_string()?;
    println!("{hello}, {world}!");

    // a probe for a missing name is just a handle that does not exist
    assert!(!root.child("nothing/here.txt").exists());

    // deleting the root closes the archive; other handles can no longer read
    let guide = root.child("docs").child("guide");
    root.delete();
    assert!(guide.child("world.txt").read().is_err());

    std::fs::remove_dir_all(&tmp)?;
    Ok(())
}

fn print_tree(handle: &Handle, depth: usize) -> vfs_handle::Result<()> {
    let marker = if handle.is_directory() { "/" } else { "" };
    println!("{:indent$}{}{marker} ({} bytes)", "", handle.name(), handle.length(), indent = depth * 2);
    for child in handle.list()? {
        print_tree(&child, depth + 1)?;
    }
    Ok(())
}
