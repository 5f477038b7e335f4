//! End-to-end conversions: decode a whole PLY file and check the exact
//! OBJ output.

use failure::Error;
use ply2obj::io::{obj, ply, MeshWriter};


#[test]
fn ascii_quad_to_obj() -> Result<(), Error> {
    let ply_data = b"\
        ply\n\
        format ascii 1.0\n\
        element vertex 4\n\
        property float x\n\
        property float y\n\
        property float z\n\
        element face 1\n\
        property list uchar int vertex_indices\n\
        end_header\n\
        0 0 0\n\
        1 0 0\n\
        1 1 0\n\
        0 1 0\n\
        4 0 1 2 3\n\
    ";

    let mesh = ply::Reader::new(ply_data as &[u8])?.read()?;
    let res = obj::Writer::new(&mesh).write_to_memory()?;

    assert_eq!(res, b"\
        # Converted from PLY by ply2obj\n\
        # Vertices: 4\n\
        # Faces: 2\n\
        \n\
        v 0 0 0\n\
        v 1 0 0\n\
        v 1 1 0\n\
        v 0 1 0\n\
        \n\
        f 1 2 3\n\
        f 1 3 4\n\
        " as &[u8]
    );

    Ok(())
}

#[test]
fn binary_colored_mesh_to_obj() -> Result<(), Error> {
    use std::io::Write;
    use byteorder::{LittleEndian, WriteBytesExt};

    let mut ply_data = Vec::new();
    ply_data.extend_from_slice(b"\
        ply\n\
        format binary_little_endian 1.0\n\
        element vertex 3\n\
        property float x\n\
        property float y\n\
        property float z\n\
        property uchar red\n\
        property uchar green\n\
        property uchar blue\n\
        element face 1\n\
        property list uchar int vertex_indices\n\
        end_header\n\
    ");
    for &(pos, color) in &[
        ([0.0f32, 0.0, 0.0], [255u8, 0, 0]),
        ([2.0, 0.0, 0.0], [0, 255, 0]),
        ([0.0, 2.0, 0.0], [0, 0, 255]),
    ] {
        for &p in &pos {
            ply_data.write_f32::<LittleEndian>(p)?;
        }
        ply_data.write_all(&color)?;
    }
    ply_data.write_u8(3)?;
    for &index in &[0i32, 1, 2] {
        ply_data.write_i32::<LittleEndian>(index)?;
    }

    let mesh = ply::Reader::new(&ply_data[..])?.read()?;
    let res = obj::Writer::new(&mesh).write_to_memory()?;

    assert_eq!(res, b"\
        # Converted from PLY by ply2obj\n\
        # Vertices: 3\n\
        # Faces: 1\n\
        # Has vertex colors (appended to 'v' lines as r g b)\n\
        \n\
        v 0 0 0 1 0 0\n\
        v 2 0 0 0 1 0\n\
        v 0 2 0 0 0 1\n\
        \n\
        f 1 2 3\n\
        " as &[u8]
    );

    Ok(())
}
