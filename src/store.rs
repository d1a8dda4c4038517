use std::{
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};

use crate::models::Snapshot;

pub fn load(path: &Path) -> io::Result<Snapshot> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        // First run: no file yet, start empty.
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Snapshot::default()),
        Err(e) => return Err(e),
    };

    let mut snap: Snapshot =
        serde_json::from_str(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    // A hand-edited or corrupted counter gets recomputed from the tasks
    // themselves. IDs must keep climbing past everything already stored.
    if snap.next_id == 0 {
        let max_id = snap.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        snap.next_id = max_id + 1;
    }

    Ok(snap)
}

pub fn save(path: &Path, snap: &Snapshot) -> io::Result<()> {
    let text = serde_json::to_string_pretty(snap)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    // Write a sibling temp file first, then rename over the target. The
    // rename is atomic, so a crash mid-write leaves the old file intact.
    let tmp = tmp_path(path);
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
