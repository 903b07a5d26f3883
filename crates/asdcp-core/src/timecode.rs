//! Timecode arithmetic.

use tracing::error;

// constants for 30 fps drop-frame timecode
const DF_FRAMES_IN_1_MIN: u32 = 1798;
const DF_FRAMES_IN_10_MIN: u32 = 17982;
const DF_FRAMES_PER_HOUR: u32 = 107892;

/// Convert `hh:mm:ss:ff` at `fps` to a frame count.
///
/// Drop-frame counting is only defined at 30 fps; requesting it at any
/// other rate logs an error and returns 0.
pub fn tc_to_frames(fps: u16, hh: u16, mm: u16, ss: u16, ff: u16, df: bool) -> u32 {
    let (fps, hh, mm, ss, ff) = (
        u32::from(fps),
        u32::from(hh),
        u32::from(mm),
        u32::from(ss),
        u32::from(ff),
    );

    if df {
        if fps != 30 {
            error!("drop-frame timecode is not supported at {fps} fps");
            return 0;
        }

        hh * DF_FRAMES_PER_HOUR
            + (mm / 10) * DF_FRAMES_IN_10_MIN
            + (mm % 10) * DF_FRAMES_IN_1_MIN
            + ss * fps
            + ff
    } else {
        ((hh * 60 + mm) * 60 + ss) * fps + ff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_drop_frame_counts() {
        assert_eq!(tc_to_frames(24, 0, 0, 1, 0, false), 24);
        assert_eq!(tc_to_frames(24, 1, 0, 0, 0, false), 86400);
        assert_eq!(tc_to_frames(30, 0, 10, 0, 0, false), 18000);
    }

    #[test]
    fn drop_frame_hour() {
        assert_eq!(tc_to_frames(30, 1, 0, 0, 0, true), 107892);
        assert_eq!(tc_to_frames(30, 0, 10, 0, 0, true), 17982);
        assert_eq!(tc_to_frames(30, 0, 1, 0, 0, true), 1798);
    }

    #[test]
    fn drop_frame_requires_30_fps() {
        assert_eq!(tc_to_frames(24, 1, 0, 0, 0, true), 0);
    }
}
