use super::*;

const SAFARI: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 \
                      (KHTML, like Gecko) Version/17.4 Safari/605.1.15";
const CHROME: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                      (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const ANDROID: &str = "Mozilla/5.0 (Linux; Android 14) AppleWebKit/537.36 (KHTML, like Gecko) \
                       Version/4.0 Safari/537.36";

#[test]
fn user_agent_detection() {
    assert_eq!(RenderCaps::from_user_agent(SAFARI), RenderCaps::fallback());
    assert_eq!(RenderCaps::from_user_agent(CHROME), RenderCaps::default());
    assert_eq!(RenderCaps::from_user_agent(ANDROID), RenderCaps::default());
    assert_eq!(RenderCaps::from_user_agent(""), RenderCaps::default());
}

#[test]
fn blur_strategy_follows_caps() {
    assert_eq!(RenderCaps::default().blur_strategy(), BlurStrategy::Native);
    assert_eq!(RenderCaps::fallback().blur_strategy(), BlurStrategy::Downsampled);
}

#[test]
fn frame_pixel_access_and_straight_copy() {
    let mut f = FrameRGBA::transparent(Canvas {
        width: 2,
        height: 1,
    });
    f.data[4..8].copy_from_slice(&[64, 32, 0, 128]);
    assert_eq!(f.pixel(1, 0), Some([64, 32, 0, 128]));
    assert_eq!(f.pixel(2, 0), None);
    let straight = f.to_straight_rgba();
    assert_eq!(&straight[4..8], &[128, 64, 0, 128]);
    assert_eq!(f.canvas().width, 2);
}
