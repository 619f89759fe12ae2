use argh::FromArgs;
use std::path::PathBuf;

use posealign::{io::viewpoint::extract_viewpoints, PipelineConfig};

#[derive(FromArgs)]
/// Align COLMAP predicted poses with the ground-truth annotations of one sequence
struct Args {
    /// path to the COLMAP images.txt file
    #[argh(option)]
    poses_path: PathBuf,

    /// path to the frame_annotations.json file
    #[argh(option)]
    annotations_path: PathBuf,

    /// name of the sequence to align
    #[argh(option)]
    sequence: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = PipelineConfig::new(args.poses_path, args.annotations_path, args.sequence);
    let aligned = posealign::run(&config)?;

    println!(
        "Aligned #{} poses into {}",
        aligned.len(),
        config.output_path.display()
    );

    // preview the first pairs of predicted and ground-truth poses
    let preview = aligned.head(5);
    match extract_viewpoints(&preview) {
        Ok(viewpoints) => {
            for (row, viewpoint) in preview.rows().zip(viewpoints) {
                let cell = |name: &str| row.get(name).map(|c| c.to_string()).unwrap_or_default();
                log::info!(
                    "{} q=[{}, {}, {}, {}] t=[{}, {}, {}] gt={:?}",
                    cell("name"),
                    cell("qw"),
                    cell("qx"),
                    cell("qy"),
                    cell("qz"),
                    cell("tx"),
                    cell("ty"),
                    cell("tz"),
                    viewpoint
                );
            }
        }
        Err(e) => log::warn!("no ground-truth viewpoint to preview: {e}"),
    }

    Ok(())
}
