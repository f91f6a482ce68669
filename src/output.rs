/// Output layout: `<base_dir>/<channel>/<yyyy-mm-dd>_<title>.txt`
use std::path::{Path, PathBuf};

use crate::youtube::VideoDescriptor;

const DATE_LEN: usize = "yyyy-mm-dd".len();

/// File name for a video's transcript.
///
/// The date part is the publish timestamp with `:` and `.` replaced by `-`,
/// cut to ten characters. Spaces and `/` in the title become `_` so the
/// name never introduces a path separator.
pub fn transcript_file_name(video: &VideoDescriptor) -> String {
    let published: String = video
        .published_at
        .replace([':', '.'], "-")
        .chars()
        .take(DATE_LEN)
        .collect();
    let title = video.title.replace([' ', '/'], "_");
    format!("{}_{}.txt", published, title)
}

/// Full path of a video's transcript inside a channel directory
pub fn transcript_path(dir: &Path, video: &VideoDescriptor) -> PathBuf {
    dir.join(transcript_file_name(video))
}

/// Per-channel directory under the output root.
/// Names made only of dots would point at the root or its parent, so they become `_`.
pub fn channel_dir(base_dir: &Path, channel_name: &str) -> PathBuf {
    let name = channel_name.trim().replace('/', "_");
    if name.chars().all(|c| c == '.') {
        return base_dir.join("_");
    }
    base_dir.join(name)
}

/// Create the output root and the channel directory if they are missing
pub async fn ensure_channel_dir(base_dir: &Path, channel_name: &str) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(base_dir).await?;
    let dir = channel_dir(base_dir, channel_name);
    tokio::fs::create_dir_all(&dir).await?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn video(title: &str, published_at: &str) -> VideoDescriptor {
        VideoDescriptor::new("abc123def45", title, published_at)
    }

    #[test]
    fn test_file_name_from_date_and_title() {
        let name = transcript_file_name(&video("My Video", "2023-04-05T12:00:00.000Z"));
        assert_eq!(name, "2023-04-05_My_Video.txt");
    }

    #[test]
    fn test_file_name_is_deterministic() {
        let v = video("Same Title", "2021-01-02T03:04:05Z");
        assert_eq!(transcript_file_name(&v), transcript_file_name(&v.clone()));
    }

    #[test]
    fn test_slashes_never_nest_paths() {
        let dir = Path::new("data/channel");
        let path = transcript_path(dir, &video("A/B Test", "2023-04-05T12:00:00Z"));
        assert_eq!(path.file_name().unwrap(), "2023-04-05_A_B_Test.txt");
        assert_eq!(path.parent().unwrap(), dir);
    }

    #[test]
    fn test_short_timestamp_is_kept_whole() {
        assert_eq!(transcript_file_name(&video("x", "2023")), "2023_x.txt");
    }

    #[test]
    fn test_channel_dir_is_flat() {
        let dir = channel_dir(Path::new("data"), " AC/DC ");
        assert_eq!(dir, PathBuf::from("data").join("AC_DC"));
    }

    #[test]
    fn test_dot_names_stay_inside_base_dir() {
        let base = Path::new("data");
        for name in [".", "..", " .. ", "", "..."] {
            let dir = channel_dir(base, name);
            assert_eq!(dir, base.join("_"), "channel name {:?}", name);
            assert_eq!(dir.parent().unwrap(), base);
        }
    }

    #[test]
    fn test_dots_inside_names_are_kept() {
        assert_eq!(channel_dir(Path::new("data"), "Mr. Beast"), PathBuf::from("data").join("Mr. Beast"));
    }

    #[tokio::test]
    async fn test_ensure_channel_dir_is_idempotent() {
        let root = TempDir::new().unwrap();
        let base = root.path().join("data");

        let first = ensure_channel_dir(&base, "Channel One").await.unwrap();
        let second = ensure_channel_dir(&base, "Channel One").await.unwrap();

        assert_eq!(first, second);
        assert!(first.is_dir());
    }
}
