use std::{path::PathBuf, time::Instant};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "equicube", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an equirectangular panorama into six cube face PNGs.
    Convert(ConvertArgs),
    /// Run both backends on the same input and compare timing and output.
    Compare(CompareArgs),
    /// Write a synthetic equirectangular test pattern.
    Testcard(TestcardArgs),
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input panorama (any common raster codec; must decode to 8-bit RGB/RGBA).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output prefix; faces are written as `<prefix>_<face>.png`.
    #[arg(long)]
    out: PathBuf,

    /// Side length of each square face.
    #[arg(long)]
    face_size: u32,

    /// Backend to use.
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    backend: BackendChoice,
}

#[derive(Parser, Debug)]
struct CompareArgs {
    /// Input panorama.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Side length of each square face.
    #[arg(long)]
    face_size: u32,
}

#[derive(Parser, Debug)]
struct TestcardArgs {
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1536)]
    width: u32,

    #[arg(long, default_value_t = 1024)]
    height: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
    #[cfg(feature = "gpu")]
    Gpu,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::Compare(args) => cmd_compare(args),
        Command::Testcard(args) => cmd_testcard(args),
    }
}

fn make_projector(choice: BackendChoice) -> anyhow::Result<Box<dyn equicube::ProjectorBackend>> {
    let kind = match choice {
        BackendChoice::Cpu => equicube::ProjectorKind::Cpu,
        #[cfg(feature = "gpu")]
        BackendChoice::Gpu => equicube::ProjectorKind::Gpu,
    };
    Ok(equicube::create_projector(kind)?)
}

fn save_faces(cube: &equicube::CubeFaces, prefix: &std::path::Path) -> anyhow::Result<()> {
    if let Some(parent) = prefix.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    for (face, img) in cube.iter() {
        let mut path = prefix.as_os_str().to_owned();
        path.push(format!("_{face}.png"));
        let path = PathBuf::from(path);
        let color = match img.channels {
            equicube::Channels::Rgb => image::ColorType::Rgb8,
            equicube::Channels::Rgba => image::ColorType::Rgba8,
        };
        image::save_buffer_with_format(
            &path,
            &img.data,
            img.size,
            img.size,
            color,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let source = equicube::SourceImage::open(&args.in_path)?;
    let mut projector = make_projector(args.backend)?;

    let start = Instant::now();
    let cube = equicube::project_cubemap(projector.as_mut(), &source, args.face_size)?;
    eprintln!(
        "{:?} backend projected 6x{}x{} in {:.4}s",
        args.backend,
        args.face_size,
        args.face_size,
        start.elapsed().as_secs_f64()
    );

    save_faces(&cube, &args.out)
}

#[cfg(not(feature = "gpu"))]
fn cmd_compare(_args: CompareArgs) -> anyhow::Result<()> {
    anyhow::bail!("compare needs both backends; rebuild with `--features gpu`")
}

#[cfg(feature = "gpu")]
fn cmd_compare(args: CompareArgs) -> anyhow::Result<()> {
    let source = equicube::SourceImage::open(&args.in_path)?;

    let mut gpu = match equicube::create_projector(equicube::ProjectorKind::Gpu) {
        Ok(p) => p,
        Err(e) if e.to_string().contains("no gpu adapter available") => {
            eprintln!("skipping compare (no gpu adapter)");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let start = Instant::now();
    let gpu_cube = equicube::project_cubemap(gpu.as_mut(), &source, args.face_size)?;
    let gpu_time = start.elapsed().as_secs_f64();

    let mut cpu = equicube::create_projector(equicube::ProjectorKind::Cpu)?;
    let start = Instant::now();
    let cpu_cube = equicube::project_cubemap(cpu.as_mut(), &source, args.face_size)?;
    let cpu_time = start.elapsed().as_secs_f64();

    let mut identical = true;
    for (face, cpu_img) in cpu_cube.iter() {
        if gpu_cube.get(face).data != cpu_img.data {
            identical = false;
            eprintln!("face {face}: outputs differ");
        }
    }

    println!("cpu: {cpu_time:.4}s");
    println!("gpu: {gpu_time:.4}s ({:.1}x)", cpu_time / gpu_time.max(1e-9));
    println!("identical: {identical}");
    if !identical {
        anyhow::bail!("backends disagree");
    }
    Ok(())
}

fn cmd_testcard(args: TestcardArgs) -> anyhow::Result<()> {
    let card = equicube::testcard(args.width, args.height)?;
    image::save_buffer_with_format(
        &args.out,
        card.data(),
        card.width(),
        card.height(),
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
