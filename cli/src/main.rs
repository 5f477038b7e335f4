use std::time::Instant;

use failure::{Error, ResultExt};
use structopt::StructOpt;

use ply2obj::{
    io::{obj, ply, MeshWriter},
    MeshData,
};

#[macro_use]
mod ui;


/// Converts a PLY mesh file into a Wavefront OBJ file.
#[derive(StructOpt, Debug)]
#[structopt(name = "ply2obj")]
pub struct Args {
    /// Path to the source PLY file.
    pub source: String,

    /// Path to the target OBJ file. Overwritten if it already exists.
    pub target: String,

    /// If set, information about the source mesh won't be printed.
    #[structopt(long = "--no-info")]
    pub no_info: bool,
}

/// We just catch potential errors here and pretty print them. The actual
/// useful code is in `run()`.
fn main() {
    if let Err(e) = run() {
        error!("An error occured: {}", e);

        for cause in e.iter_causes() {
            error!("  ... caused by: {}", cause);
        }

        if std::env::var("RUST_BACKTRACE") == Ok("1".to_string()) {
            error!();
            error!("{}", e.backtrace());
        }

        std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let args = Args::from_args();
    let start_time = Instant::now();

    let before_load = Instant::now();
    let mesh = load_file(&args).context("could not read source file")?;
    let load_time = before_load.elapsed();

    for warning in &mesh.warnings {
        warn!("{}", warning);
    }

    if !args.no_info {
        info!(
            "Mesh: {} vertices, {} triangles",
            ui::fmt_with_thousand_sep(mesh.vertices.len() as u64),
            ui::fmt_with_thousand_sep(mesh.triangles.len() as u64),
        );
        if mesh.flags.has_normals {
            info!("The mesh contains vertex normals");
        }
        if mesh.flags.has_colors {
            info!("The mesh contains vertex colors");
        }
        if mesh.flags.has_tex_coords {
            info!("The mesh contains texture coordinates");
        }
    }

    let before_write = Instant::now();
    write_file(&args, &mesh).context("could not write target file")?;
    let write_time = before_write.elapsed();

    info!(
        "Processing time: {:.2?} ({:.2?} reading, {:.2?} writing)",
        start_time.elapsed(),
        load_time,
        write_time,
    );

    Ok(())
}

fn load_file(args: &Args) -> Result<MeshData, Error> {
    let reader = ply::Reader::open(&args.source)
        .context(format!("failed to open '{}'", args.source))?;

    if !args.no_info {
        info!(
            "Source format: PLY ({} encoding), {} vertices and {} faces declared",
            reader.encoding(),
            ui::fmt_with_thousand_sep(reader.vertex_count()),
            ui::fmt_with_thousand_sep(reader.face_count()),
        );
    }

    let mesh = progress!(["Reading '{}'", args.source] => {
        reader.read()?
    });

    Ok(mesh)
}

fn write_file(args: &Args, mesh: &MeshData) -> Result<(), Error> {
    progress!(["Writing mesh to '{}'", args.target] => {
        obj::Writer::new(mesh).write_to_file(&args.target)?;
    });

    Ok(())
}
