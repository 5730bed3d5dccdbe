//! Mapping host paths onto the emulated `C:` drive.
//!
//! The emulator mounts one host directory as `C:`. Every file the session
//! touches has to live below that directory, so it is chosen as the deepest
//! common ancestor of the interpreter and the program.

use std::path::{Path, PathBuf};

use crate::error::{LauncherError, LauncherResult};

/// Drive the ancestor directory is mounted as.
pub const DOS_DRIVE: &str = "C:";

/// Deepest directory that contains both `left` and `right`.
///
/// Whichever path is currently longer is replaced by its parent until the two
/// meet. Running out of parents (disjoint drives, or relative paths with no
/// shared first segment) is an error rather than an empty ancestor.
pub fn common_ancestor(left: &Path, right: &Path) -> LauncherResult<PathBuf> {
    let no_ancestor = || LauncherError::NoCommonAncestor(left.to_path_buf(), right.to_path_buf());
    let parent = |p: &Path| -> Option<PathBuf> {
        p.parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
    };

    let mut l = left.to_path_buf();
    let mut r = right.to_path_buf();
    while l != r {
        if l.as_os_str().len() > r.as_os_str().len() {
            l = parent(&l).ok_or_else(no_ancestor)?;
        } else {
            r = parent(&r).ok_or_else(no_ancestor)?;
        }
    }
    Ok(l)
}

/// Render `path` as seen from inside the emulator, where `ancestor` is `C:\`.
///
/// `path` must be `ancestor` itself or lie below it.
///
/// ```
/// use std::path::Path;
/// use launcher_core::relative_dos_path;
///
/// let root = Path::new("/data");
/// assert_eq!(relative_dos_path(root, root).unwrap(), "C:\\");
/// assert_eq!(
///     relative_dos_path(Path::new("/data/src/HELLO.BAS"), root).unwrap(),
///     "C:\\src\\HELLO.BAS"
/// );
/// ```
pub fn relative_dos_path(path: &Path, ancestor: &Path) -> LauncherResult<String> {
    let outside = || LauncherError::OutsideAncestor {
        path: path.to_path_buf(),
        ancestor: ancestor.to_path_buf(),
    };

    let mut segments: Vec<&str> = Vec::new();
    let mut current = path;
    while current != ancestor {
        let name = current.file_name().ok_or_else(outside)?;
        let name = name
            .to_str()
            .ok_or_else(|| LauncherError::NonUtf8Path(path.to_path_buf()))?;
        segments.push(name);
        current = current.parent().ok_or_else(outside)?;
    }
    segments.reverse();

    Ok(format!("{}\\{}", DOS_DRIVE, segments.join("\\")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ancestor(a: &str, b: &str) -> PathBuf {
        common_ancestor(Path::new(a), Path::new(b)).unwrap()
    }

    #[test]
    fn test_common_ancestor_equal_inputs() {
        assert_eq!(ancestor("/home/test", "/home/test"), PathBuf::from("/home/test"));
    }

    #[test]
    fn test_common_ancestor_nested() {
        assert_eq!(ancestor("/home/test", "/home/test/src"), PathBuf::from("/home/test"));
        assert_eq!(ancestor("/home/test/src/deep", "/home/test"), PathBuf::from("/home/test"));
    }

    #[test]
    fn test_common_ancestor_siblings() {
        assert_eq!(ancestor("/basic/bin", "/basic/src"), PathBuf::from("/basic"));
        assert_eq!(ancestor("/opt/basic", "/data/src"), PathBuf::from("/"));
    }

    #[test]
    fn test_common_ancestor_respects_segment_boundaries() {
        // "/a/b" is a string prefix of "/a/bb" but not a directory ancestor
        assert_eq!(ancestor("/a/bb", "/a/b"), PathBuf::from("/a"));
        assert_eq!(ancestor("/a/b/c", "/a/bb"), PathBuf::from("/a"));
    }

    #[test]
    fn test_common_ancestor_is_prefix_of_both() {
        let pairs = [
            ("/srv/www/cgi-bin/basic", "/srv/www/htdocs"),
            ("/x/y/z", "/x/y/z/w/v"),
            ("/one/two", "/three/four/five"),
        ];
        for (a, b) in pairs {
            let anc = ancestor(a, b);
            assert!(Path::new(a).starts_with(&anc), "{} vs {:?}", a, anc);
            assert!(Path::new(b).starts_with(&anc), "{} vs {:?}", b, anc);
        }
    }

    #[test]
    fn test_common_ancestor_disjoint_trees() {
        let err = common_ancestor(Path::new("left/bin"), Path::new("right/src")).unwrap_err();
        assert!(matches!(err, LauncherError::NoCommonAncestor(_, _)));
    }

    #[cfg(windows)]
    #[test]
    fn test_common_ancestor_different_drives() {
        let err = common_ancestor(Path::new("C:\\basic"), Path::new("D:\\src")).unwrap_err();
        assert!(matches!(err, LauncherError::NoCommonAncestor(_, _)));
    }

    #[test]
    fn test_relative_dos_path_root() {
        let root = Path::new("/home/test");
        assert_eq!(relative_dos_path(root, root).unwrap(), "C:\\");
    }

    #[test]
    fn test_relative_dos_path_same_level() {
        let dos = relative_dos_path(Path::new("/home/test/PROGRAM.BAS"), Path::new("/home/test"));
        assert_eq!(dos.unwrap(), "C:\\PROGRAM.BAS");
    }

    #[test]
    fn test_relative_dos_path_nested() {
        let dos = relative_dos_path(Path::new("/home/test/PROGRAM.BAS"), Path::new("/home"));
        assert_eq!(dos.unwrap(), "C:\\test\\PROGRAM.BAS");

        let dos = relative_dos_path(Path::new("/anc/sub/file.txt"), Path::new("/anc"));
        assert_eq!(dos.unwrap(), "C:\\sub\\file.txt");
    }

    #[test]
    fn test_relative_dos_path_from_filesystem_root() {
        let dos = relative_dos_path(Path::new("/data/src/HELLO.BAS"), Path::new("/"));
        assert_eq!(dos.unwrap(), "C:\\data\\src\\HELLO.BAS");
    }

    #[test]
    fn test_relative_dos_path_outside_ancestor() {
        let err = relative_dos_path(Path::new("/other/FILE.TXT"), Path::new("/home/test"))
            .unwrap_err();
        assert!(matches!(err, LauncherError::OutsideAncestor { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_dos_path_rejects_non_utf8_segment() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new("/anc").join(OsStr::from_bytes(b"\xff")).join("FILE.TXT");
        let err = relative_dos_path(&path, Path::new("/anc")).unwrap_err();
        match err {
            LauncherError::NonUtf8Path(p) => assert_eq!(p, path),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
