use spin::Mutex;

use layerfb::blit::{self, AlphaMode, LayerSetup, Source, Stage, TransferConfig, TransferMode};
use layerfb::{
    BlitError, Blitter, Color, ColorMode, ConfigError, FrameBuffer, LayerConfig, LayerId, Lcd,
    Painter, PixelFormat, Region, SharedBlitter, SoftBlitter, Surface,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Init(TransferConfig),
    ConfigLayer(usize, LayerSetup),
    Start { offset: usize, width: u32, height: u32 },
    Poll(u32),
}

/// Records every stage and forwards it to a software engine
#[derive(Default)]
struct RecordingBlitter {
    calls: Vec<Call>,
    engine: SoftBlitter,
}

impl RecordingBlitter {
    fn failing_at(stage: Stage, error: BlitError) -> Self {
        Self {
            calls: Vec::new(),
            engine: SoftBlitter::new().fail_at(stage, error),
        }
    }
}

impl Blitter for RecordingBlitter {
    fn init(&mut self, config: &TransferConfig) -> Result<(), BlitError> {
        self.calls.push(Call::Init(*config));
        self.engine.init(config)
    }

    fn config_layer(&mut self, layer: usize, setup: &LayerSetup) -> Result<(), BlitError> {
        self.calls.push(Call::ConfigLayer(layer, *setup));
        self.engine.config_layer(layer, setup)
    }

    fn start(
        &mut self,
        source: Source<'_>,
        dest: &mut FrameBuffer<'_>,
        dest_offset: usize,
        width: u32,
        height: u32,
    ) -> Result<(), BlitError> {
        self.calls.push(Call::Start {
            offset: dest_offset,
            width,
            height,
        });
        self.engine.start(source, dest, dest_offset, width, height)
    }

    fn poll_for_transfer(&mut self, timeout: u32) -> Result<(), BlitError> {
        self.calls.push(Call::Poll(timeout));
        self.engine.poll_for_transfer(timeout)
    }
}

fn surface(mem: &mut [u32], format: PixelFormat, width: u32, height: u32) -> Surface<'_> {
    Surface::new(FrameBuffer::from_words(mem), LayerConfig::new(format, width, height)).unwrap()
}

#[test_log::test]
fn fill_runs_the_four_stages_in_order() {
    let mut mem = vec![0u32; 200 * 10];
    let mut layer = surface(&mut mem, PixelFormat::Argb8888, 200, 10);
    let mut blitter = RecordingBlitter::default();

    let region = Region::within(200, 3, 4, 50, 2);
    blit::fill_region(&mut blitter, 1, &mut layer, region, Color::CYAN, 100).unwrap();

    assert_eq!(
        blitter.calls,
        vec![
            Call::Init(TransferConfig {
                mode: TransferMode::RegisterToMemory,
                color_mode: ColorMode::Argb8888,
                output_offset: 150,
            }),
            Call::ConfigLayer(1, LayerSetup::passthrough(ColorMode::Argb8888)),
            Call::Start {
                offset: 4 * (4 * 200 + 3),
                width: 50,
                height: 2
            },
            Call::Poll(100),
        ]
    );
    assert_eq!(layer.read_pixel(52, 5).unwrap(), Color::CYAN);
    assert_eq!(layer.read_pixel(53, 5).unwrap().argb(), 0);
}

#[test_log::test]
fn a_failing_stage_skips_the_rest() {
    let cases = [
        (Stage::Init, 1),
        (Stage::ConfigLayer, 2),
        (Stage::Start, 3),
        (Stage::Poll, 4),
    ];
    for (stage, calls) in cases {
        let mut mem = vec![0u32; 16];
        let mut layer = surface(&mut mem, PixelFormat::Argb8888, 4, 4);
        let mut blitter = RecordingBlitter::failing_at(stage, BlitError::Timeout);

        let region = Region::full(&layer);
        let result = blit::fill_region(&mut blitter, 0, &mut layer, region, Color::RED, 100);
        assert_eq!(result, Err(BlitError::Timeout), "{stage:?}");
        assert_eq!(blitter.calls.len(), calls, "{stage:?}");
    }
}

#[test_log::test]
fn unsupported_formats_never_reach_the_engine() {
    let mut mem = vec![0u32; 8];
    let mut layer = surface(&mut mem, PixelFormat::L8, 4, 4);
    let mut blitter = RecordingBlitter::default();

    let region = Region::full(&layer);
    let result = blit::fill_region(&mut blitter, 0, &mut layer, region, Color::RED, 100);
    assert_eq!(
        result,
        Err(BlitError::Config(ConfigError::UnsupportedFormat(PixelFormat::L8)))
    );
    assert!(blitter.calls.is_empty());
}

#[test_log::test]
fn primitives_swallow_engine_failures() {
    let mut mem = vec![0u32; 16];
    let mut layer = surface(&mut mem, PixelFormat::Argb8888, 4, 4);
    let mut blitter = RecordingBlitter::failing_at(Stage::Start, BlitError::Transfer);

    let mut painter = Painter::new(0, &mut layer, &mut blitter);
    painter.fill_rect(0, 0, 4, 4);
    painter.draw_hline(0, 0, 4);
    painter.clear(Color::RED);
    drop(painter);

    assert_eq!(layer.read_pixel(0, 0).unwrap().argb(), 0);
    assert!(!blitter.calls.iter().any(|c| matches!(c, Call::Poll(_))));
}

#[test_log::test]
fn vertical_lines_skip_a_row_minus_one() {
    let mut mem = vec![0u32; 32 * 8];
    let mut layer = surface(&mut mem, PixelFormat::Rgb565, 32, 8);
    let mut blitter = RecordingBlitter::default();

    Painter::new(0, &mut layer, &mut blitter).draw_vline(5, 1, 6);

    assert!(blitter.calls.contains(&Call::Init(TransferConfig {
        mode: TransferMode::RegisterToMemory,
        color_mode: ColorMode::Rgb565,
        output_offset: 31,
    })));
    assert!(blitter.calls.contains(&Call::Start {
        offset: 2 * (32 + 5),
        width: 1,
        height: 6
    }));
}

#[test_log::test]
fn line_conversion_expands_to_argb8888() {
    let mut src_mem = vec![0u32; 2];
    let mut src = FrameBuffer::from_words(&mut src_mem);
    for (i, px) in [0xF800u16, 0x07E0, 0x001F, 0xFFFF].into_iter().enumerate() {
        src.write_u16(i * 2, px).unwrap();
    }
    let mut dst_mem = vec![0u32; 4];
    let mut dst = FrameBuffer::from_words(&mut dst_mem);
    let mut blitter = RecordingBlitter::default();

    blit::convert_line(&mut blitter, &src, 0, &mut dst, 0, 4, ColorMode::Rgb565, 10).unwrap();

    assert_eq!(
        blitter.calls[..2],
        [
            Call::Init(TransferConfig {
                mode: TransferMode::MemoryToMemoryPfc,
                color_mode: ColorMode::Argb8888,
                output_offset: 0,
            }),
            Call::ConfigLayer(
                1,
                LayerSetup {
                    input_color_mode: ColorMode::Rgb565,
                    alpha_mode: AlphaMode::NoModify,
                    input_alpha: 0xFF,
                    input_offset: 0,
                }
            ),
        ]
    );
    assert_eq!(blitter.calls.last(), Some(&Call::Poll(10)));
    let converted: Vec<u32> = (0..4).map(|i| dst.read_u32(i * 4).unwrap()).collect();
    assert_eq!(converted, vec![0xFFFF_0000, 0xFF00_FF00, 0xFF00_00FF, 0xFFFF_FFFF]);
}

#[test_log::test]
fn lcd_uses_fill_and_convert_budgets() {
    let mut bg = vec![0u32; 16];
    let mut fg = vec![0u32; 16];
    let mut lcd = Lcd::new(
        surface(&mut bg, PixelFormat::Argb8888, 4, 4),
        surface(&mut fg, PixelFormat::Argb8888, 4, 4),
        RecordingBlitter::default(),
    );

    lcd.select_layer(LayerId::Foreground);
    lcd.fill_rect(0, 0, 1, 1);
    assert_eq!(lcd.blitter().calls.last(), Some(&Call::Poll(100)));
    assert!(lcd
        .blitter()
        .calls
        .contains(&Call::ConfigLayer(1, LayerSetup::passthrough(ColorMode::Argb8888))));

    let mut line = vec![0x00C0_FFEEu32; 2];
    let src = FrameBuffer::from_words(&mut line);
    let mut out = vec![0u32; 2];
    let mut dst = FrameBuffer::from_words(&mut out);
    lcd.convert_line(&src, 0, &mut dst, 0, 2, ColorMode::Argb8888).unwrap();
    assert_eq!(lcd.blitter().calls.last(), Some(&Call::Poll(10)));
    assert_eq!(dst.read_u32(4).unwrap(), 0x00C0_FFEE);
}

#[test_log::test]
fn layers_can_share_one_engine() {
    static ENGINE: Mutex<SoftBlitter> = Mutex::new(SoftBlitter::new());

    let mut bg = vec![0u32; 16];
    let mut fg = vec![0u32; 16];
    let mut background = surface(&mut bg, PixelFormat::Argb8888, 4, 4);
    let mut foreground = surface(&mut fg, PixelFormat::Argb8888, 4, 4);
    let mut a = SharedBlitter::new(&ENGINE);
    let mut b = a;

    Painter::new(LayerId::Background.index(), &mut background, &mut a).clear(Color::GREEN);
    Painter::new(LayerId::Foreground.index(), &mut foreground, &mut b).clear(Color::MAGENTA);

    assert_eq!(background.read_pixel(3, 3).unwrap(), Color::GREEN);
    assert_eq!(foreground.read_pixel(3, 3).unwrap(), Color::MAGENTA);
    assert_eq!(ENGINE.lock().completed(), 2);
}
