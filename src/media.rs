// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Component;
use std::path::PathBuf;

use percent_encoding::AsciiSet;
use percent_encoding::CONTROLS;
use percent_encoding::utf8_percent_encode;

/// Characters escaped in image URLs. Slashes are kept so the path stays
/// readable.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Resolves image paths from the question bank against the bank's directory.
///
/// Paths arrive from the browser, so directory traversal must be impossible.
#[derive(Clone)]
pub struct ImageLoader {
    /// Absolute path to the directory of the question bank.
    root: PathBuf,
}

/// Errors that can occur when loading an image.
#[derive(Debug, PartialEq)]
pub enum ImageLoaderError {
    /// Path is empty.
    Empty,
    /// Path is absolute.
    Absolute,
    /// Path contains parent (`..`) components.
    ParentComponent,
    /// Path does not exist.
    NotFound,
    /// Path is not a file.
    NotFile,
    /// Path points to a symbolic link.
    SymbolicLink,
}

impl ImageLoader {
    pub fn new(root: PathBuf) -> Self {
        assert!(root.is_absolute());
        Self { root }
    }

    /// Check that `path` names a regular file inside the root directory and
    /// return its absolute path.
    pub fn validate(&self, path: &str) -> Result<PathBuf, ImageLoaderError> {
        if path.trim().is_empty() {
            return Err(ImageLoaderError::Empty);
        }
        let path: PathBuf = PathBuf::from(path);
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(ImageLoaderError::ParentComponent);
        }
        if path.is_absolute() {
            return Err(ImageLoaderError::Absolute);
        }
        let path: PathBuf = self.root.join(path);
        if path.is_symlink() {
            return Err(ImageLoaderError::SymbolicLink);
        }
        if !path.exists() {
            return Err(ImageLoaderError::NotFound);
        }
        if !path.is_file() {
            return Err(ImageLoaderError::NotFile);
        }
        Ok(path)
    }
}

/// The URL the drill page uses to fetch an image.
pub fn image_url(path: &str) -> String {
    format!("/image/{}", utf8_percent_encode(path, PATH_SEGMENT))
}

/// The content type of an image, from its extension.
pub fn content_type(path: &std::path::Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::fs::create_dir;

    use super::*;
    use crate::error::Fallible;
    use crate::helper::create_tmp_directory;

    #[test]
    fn test_valid() -> Fallible<()> {
        let root = create_tmp_directory()?;
        create_dir(root.join("Images"))?;
        File::create(root.join("Images/diagram.png"))?;
        let loader = ImageLoader::new(root.clone());
        assert_eq!(
            loader.validate("Images/diagram.png"),
            Ok(root.join("Images/diagram.png"))
        );
        Ok(())
    }

    #[test]
    fn test_rejected() -> Fallible<()> {
        let root = create_tmp_directory()?;
        create_dir(root.join("dir"))?;
        let loader = ImageLoader::new(root);
        assert_eq!(loader.validate(" "), Err(ImageLoaderError::Empty));
        assert_eq!(loader.validate("/etc/passwd"), Err(ImageLoaderError::Absolute));
        assert_eq!(
            loader.validate("../../etc/passwd"),
            Err(ImageLoaderError::ParentComponent)
        );
        assert_eq!(loader.validate("nope.png"), Err(ImageLoaderError::NotFound));
        assert_eq!(loader.validate("dir"), Err(ImageLoaderError::NotFile));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink() -> Fallible<()> {
        let root = create_tmp_directory()?;
        File::create(root.join("real.png"))?;
        std::os::unix::fs::symlink(root.join("real.png"), root.join("link.png"))?;
        let loader = ImageLoader::new(root);
        assert_eq!(loader.validate("link.png"), Err(ImageLoaderError::SymbolicLink));
        Ok(())
    }

    #[test]
    fn test_image_url() {
        assert_eq!(image_url("Images/my diagram.png"), "/image/Images/my%20diagram.png");
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(std::path::Path::new("a.PNG")), "image/png");
        assert_eq!(content_type(std::path::Path::new("a.jpg")), "image/jpeg");
        assert_eq!(content_type(std::path::Path::new("a")), "application/octet-stream");
    }
}
