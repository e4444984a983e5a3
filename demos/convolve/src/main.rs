use argh::FromArgs;
use std::time::Instant;

use konv::{
    image::{ops, Image, ImageSize},
    imgproc::{
        self,
        filter::{list_kernels, Kernel, KernelPreset, KernelSelection, CUSTOM_KERNEL_NAME},
        parallel::ExecutionStrategy,
    },
};

#[derive(FromArgs)]
/// Convolve a synthetic grayscale test pattern with a preset or custom kernel
struct Args {
    /// the kernel name: blur, sharpen, edge, emboss or custom
    #[argh(option, short = 'k', default = "String::from(\"blur\")")]
    kernel: String,

    /// the custom kernel as text, one row per line or separated by ';'
    #[argh(option)]
    custom: Option<String>,

    /// the custom kernel as a JSON list of rows, e.g. [[0,-1,0],[-1,5,-1],[0,-1,0]];
    /// requires --kernel custom and excludes --custom
    #[argh(option)]
    custom_json: Option<String>,

    /// the side of the square test image in pixels
    #[argh(option, default = "256")]
    size: usize,

    /// run on a dedicated pool with this many threads
    #[argh(option)]
    threads: Option<usize>,

    /// run on the current thread only
    #[argh(switch)]
    serial: bool,

    /// list the available kernels and exit
    #[argh(switch)]
    list: bool,
}

/// Gradient with a checkerboard overlay, so every kernel has edges to react to.
fn test_pattern(size: ImageSize) -> Result<Image<u8, 1>, Box<dyn std::error::Error>> {
    let cell = (size.width / 8).max(1);
    let image = Image::from_fn(size, |x, y| {
        let gradient = (x * 160 / size.width.max(1)) as u8;
        let checker = if (x / cell + y / cell) % 2 == 0 { 90 } else { 0 };
        gradient + checker
    })?;
    Ok(image)
}

fn stats(data: &[f32]) -> (f32, f32, f32) {
    let min = data.iter().copied().fold(f32::INFINITY, f32::min);
    let max = data.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mean = data.iter().sum::<f32>() / data.len().max(1) as f32;
    (min, max, mean)
}

/// Resolve the kernel from `--kernel`, `--custom` and `--custom-json`.
fn select_kernel(args: &Args) -> Result<Kernel, Box<dyn std::error::Error>> {
    let Some(json) = &args.custom_json else {
        return Ok(KernelSelection::resolve(&args.kernel, args.custom.as_deref())?.into_kernel());
    };

    if !args.kernel.trim().eq_ignore_ascii_case(CUSTOM_KERNEL_NAME) {
        return Err(format!("--custom-json requires --kernel {CUSTOM_KERNEL_NAME}").into());
    }
    if args.custom.is_some() {
        return Err("--custom and --custom-json are mutually exclusive".into());
    }

    Ok(serde_json::from_str(json)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    if args.list {
        for name in list_kernels() {
            let description = match name.parse::<KernelPreset>() {
                Ok(preset) => preset.description(),
                Err(_) => "User-defined custom convolution kernel.",
            };
            println!("{name:<8} {description}");
        }
        return Ok(());
    }

    let kernel = select_kernel(&args)?;
    println!("Kernel ({}x{}):\n{}", kernel.rows(), kernel.cols(), kernel);

    let strategy = match (args.serial, args.threads) {
        (true, _) => ExecutionStrategy::Serial,
        (false, Some(n)) => ExecutionStrategy::Fixed(n),
        (false, None) => ExecutionStrategy::AutoRows,
    };

    let size = ImageSize {
        width: args.size,
        height: args.size,
    };
    let img_u8 = test_pattern(size)?;

    let img_f32 = ops::to_intensity_f32(&img_u8)?;

    let start = Instant::now();
    let filtered = imgproc::filter::convolve_with_strategy(&img_f32, &kernel, strategy)?;
    log::info!(
        "convolved {} in {:?} using {strategy}",
        filtered.size(),
        start.elapsed()
    );

    let filtered_u8 = ops::to_u8_saturating(&filtered)?;

    let (min, max, mean) = stats(img_f32.as_slice());
    println!("Input:  min {min:.1} max {max:.1} mean {mean:.2}");
    let (min, max, mean) = stats(filtered.as_slice());
    println!("Output: min {min:.1} max {max:.1} mean {mean:.2}");

    let center = filtered_u8.get_pixel(size.width / 2, size.height / 2, 0)?;
    println!("Output center pixel: {center}");

    Ok(())
}
