// Export of the revealed card: render at double density, encode PNG, then hand it to a
// share target when one accepts it, or drop it into the download folder.

use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::process::Command;

use image::{ImageFormat, RgbaImage};
use tracing::{info, warn};

use crate::card::{CARD_HEIGHT, CARD_WIDTH, CardView};
use crate::error::Error;
use crate::gamma::GammaLut;
use crate::notice::Notice;
use crate::theme::unpack;

pub const EXPORT_FILE_NAME: &str = "christmas-blessing.png";
pub const EXPORT_TITLE: &str = "Christmas Blessing";
pub const EXPORT_MIME: &str = "image/png";
/// Device pixels per logical pixel in the exported picture.
pub const EXPORT_SCALE: f32 = 2.0;

/// Render the card at its fixed logical size and double density.
pub fn capture_card(card: &CardView, lut: &GammaLut) -> RgbaImage {
    let fb = card.render_sized(CARD_WIDTH, CARD_HEIGHT, EXPORT_SCALE, lut);
    let mut img = RgbaImage::new(fb.width as u32, fb.height as u32);
    for (px, &c) in img.pixels_mut().zip(fb.pixels.iter()) {
        let (r, g, b) = unpack(c);
        px.0 = [r, g, b, 255];
    }
    img
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, Error> {
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharedFile {
    pub name: String,
    pub mime: String,
    pub title: String,
    pub bytes: Vec<u8>,
}

impl SharedFile {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            name: EXPORT_FILE_NAME.to_string(),
            mime: EXPORT_MIME.to_string(),
            title: EXPORT_TITLE.to_string(),
            bytes,
        }
    }
}

/// A native share sheet, if the host has one.
pub trait ShareTarget {
    /// Whether this particular file can be shared.
    fn can_share(&self, file: &SharedFile) -> bool;
    fn share(&mut self, file: &SharedFile) -> Result<(), Error>;
}

/// Hands the card to an external program (a desktop share helper, an uploader, ...)
/// as a file argument. The file is staged first; a non-zero exit counts as failure.
pub struct ProgramShare {
    program: PathBuf,
    staging: PathBuf,
}

impl ProgramShare {
    pub fn new(program: impl Into<PathBuf>, staging: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), staging: staging.into() }
    }
}

impl ShareTarget for ProgramShare {
    fn can_share(&self, file: &SharedFile) -> bool {
        file.mime == EXPORT_MIME
    }

    fn share(&mut self, file: &SharedFile) -> Result<(), Error> {
        let path = self.staging.join(&file.name);
        fs::write(&path, &file.bytes)?;
        let status = Command::new(&self.program).arg(&path).status()?;
        if !status.success() {
            return Err(Error::Share(format!("{} exited with {status}", self.program.display())));
        }
        Ok(())
    }
}

pub struct DownloadFolder {
    dir: PathBuf,
}

impl DownloadFolder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn save(&self, file: &SharedFile) -> Result<PathBuf, Error> {
        let path = self.dir.join(&file.name);
        fs::write(&path, &file.bytes)?;
        Ok(path)
    }
}

/// Capture, encode and deliver the card. Returns the notice to show, if any:
/// nothing after a successful share, "saved" after a download, a destructive
/// notice on any failure.
pub fn share_blessing(
    card: &CardView,
    lut: &GammaLut,
    share: Option<&mut dyn ShareTarget>,
    downloads: &DownloadFolder,
) -> Option<Notice> {
    match deliver(card, lut, share, downloads) {
        Ok(Delivery::Shared) => None,
        Ok(Delivery::Saved(path)) => {
            info!(path = %path.display(), "card saved");
            Some(Notice::info("Image saved", "You can now share it on social media."))
        }
        Err(e) => {
            warn!(error = %e, "sharing the card failed");
            Some(Notice::destructive("Share failed", "Please try again."))
        }
    }
}

enum Delivery {
    Shared,
    Saved(PathBuf),
}

fn deliver(
    card: &CardView,
    lut: &GammaLut,
    share: Option<&mut dyn ShareTarget>,
    downloads: &DownloadFolder,
) -> Result<Delivery, Error> {
    let file = SharedFile::png(encode_png(&capture_card(card, lut))?);
    if let Some(target) = share {
        if target.can_share(&file) {
            target.share(&file)?;
            info!(title = %file.title, bytes = file.bytes.len(), "card shared");
            return Ok(Delivery::Shared);
        }
    }
    Ok(Delivery::Saved(downloads.save(&file)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeKind;
    use crate::quotes::BLESSINGS;

    struct Recorder {
        accept: bool,
        fail: bool,
        received: Vec<SharedFile>,
    }

    impl ShareTarget for Recorder {
        fn can_share(&self, _file: &SharedFile) -> bool {
            self.accept
        }

        fn share(&mut self, file: &SharedFile) -> Result<(), Error> {
            if self.fail {
                return Err(Error::Io(std::io::Error::other("share sheet dismissed")));
            }
            self.received.push(file.clone());
            Ok(())
        }
    }

    fn card() -> CardView {
        CardView::new(BLESSINGS[0], None)
    }

    #[test]
    fn capture_is_double_density_png() {
        let lut = GammaLut::new();
        let img = capture_card(&card(), &lut);
        assert_eq!(img.dimensions(), (720, 600));
        let bytes = encode_png(&img).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!(decoded.width(), 720);
    }

    #[test]
    fn without_share_target_the_card_is_downloaded() {
        let lut = GammaLut::new();
        let dir = tempfile::tempdir().unwrap();
        let downloads = DownloadFolder::new(dir.path());
        let notice = share_blessing(&card(), &lut, None, &downloads).unwrap();
        assert_eq!(notice.kind, NoticeKind::Info);
        assert_eq!(notice.title, "Image saved");
        let saved = fs::read(dir.path().join(EXPORT_FILE_NAME)).unwrap();
        assert_eq!(&saved[1..4], b"PNG");
    }

    #[test]
    fn accepting_share_target_receives_the_file() {
        let lut = GammaLut::new();
        let dir = tempfile::tempdir().unwrap();
        let downloads = DownloadFolder::new(dir.path());
        let mut target = Recorder { accept: true, fail: false, received: Vec::new() };
        let notice = share_blessing(&card(), &lut, Some(&mut target), &downloads);
        assert!(notice.is_none());
        assert_eq!(target.received.len(), 1);
        assert_eq!(target.received[0].name, "christmas-blessing.png");
        assert_eq!(target.received[0].title, "Christmas Blessing");
        assert!(!dir.path().join(EXPORT_FILE_NAME).exists());
    }

    #[test]
    fn refusing_share_target_falls_back_to_download() {
        let lut = GammaLut::new();
        let dir = tempfile::tempdir().unwrap();
        let downloads = DownloadFolder::new(dir.path());
        let mut target = Recorder { accept: false, fail: false, received: Vec::new() };
        let notice = share_blessing(&card(), &lut, Some(&mut target), &downloads).unwrap();
        assert_eq!(notice.kind, NoticeKind::Info);
        assert!(target.received.is_empty());
        assert!(dir.path().join(EXPORT_FILE_NAME).exists());
    }

    #[cfg(unix)]
    #[test]
    fn program_share_stages_the_file_and_checks_the_exit_status() {
        let lut = GammaLut::new();
        let staging = tempfile::tempdir().unwrap();
        let downloads = tempfile::tempdir().unwrap();
        let folder = DownloadFolder::new(downloads.path());

        let mut ok = ProgramShare::new("true", staging.path());
        assert!(share_blessing(&card(), &lut, Some(&mut ok), &folder).is_none());
        assert!(staging.path().join(EXPORT_FILE_NAME).exists());
        assert!(!downloads.path().join(EXPORT_FILE_NAME).exists());

        let mut failing = ProgramShare::new("false", staging.path());
        let notice = share_blessing(&card(), &lut, Some(&mut failing), &folder).unwrap();
        assert_eq!(notice.kind, NoticeKind::Destructive);
    }

    #[test]
    fn failures_become_a_destructive_notice() {
        let lut = GammaLut::new();
        let dir = tempfile::tempdir().unwrap();
        let downloads = DownloadFolder::new(dir.path());
        let mut target = Recorder { accept: true, fail: true, received: Vec::new() };
        let notice = share_blessing(&card(), &lut, Some(&mut target), &downloads).unwrap();
        assert_eq!(notice.kind, NoticeKind::Destructive);
        assert_eq!(notice.title, "Share failed");

        let missing = DownloadFolder::new(dir.path().join("does/not/exist"));
        let notice = share_blessing(&card(), &lut, None, &missing).unwrap();
        assert_eq!(notice.kind, NoticeKind::Destructive);
    }
}
