use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Follows a growing text file, handing out complete lines as they appear.
pub struct LogTailer {
    file: File,
    position: u64,
    path: PathBuf,
}

impl LogTailer {
    /// Open `path` positioned at its current end, so only lines written from
    /// now on are returned.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref)?;
        let metadata = file.metadata()?;
        let position = metadata.len();
        Ok(Self {
            file,
            position,
            path: path_ref.to_path_buf(),
        })
    }

    pub fn read_new_lines(&mut self) -> io::Result<Vec<String>> {
        let mut lines = Vec::new();

        // File got truncated (log rotated or cleared): start over.
        let len = self.file.metadata()?.len();
        if len < self.position {
            log::debug!("{:?} shrank from {} to {} bytes, rewinding", self.path, self.position, len);
            self.position = 0;
        }

        self.file.seek(SeekFrom::Start(self.position))?;
        let mut reader = BufReader::new(&self.file);
        let mut buffer = Vec::new();

        loop {
            buffer.clear();
            let bytes_read = reader.read_until(b'\n', &mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            // A line still being written; pick it up on the next read.
            if buffer.last() != Some(&b'\n') {
                break;
            }
            self.position += bytes_read as u64;
            // Stray bytes that are not UTF-8 must not wedge the tail.
            let text = String::from_utf8_lossy(&buffer);
            lines.push(text.trim_end_matches(&['\r', '\n'][..]).to_string());
        }

        Ok(lines)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
