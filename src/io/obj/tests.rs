use cgmath::{Point2, Point3, Vector3};
use failure::Error;

use crate::{
    io::MeshWriter,
    mesh::{MeshData, MeshFlags, Triangle, Vertex},
};
use super::Writer;


fn vertex(x: f32, y: f32, z: f32) -> Vertex {
    Vertex {
        position: Point3::new(x, y, z),
        ..Vertex::new()
    }
}

fn triangle_mesh() -> MeshData {
    MeshData {
        vertices: vec![
            vertex(0.0, 0.0, 0.0),
            vertex(1.0, 0.0, 0.0),
            vertex(0.0, 1.0, 0.0),
        ],
        triangles: vec![Triangle { indices: [0, 1, 2] }],
        flags: MeshFlags::default(),
        warnings: vec![],
    }
}

#[test]
fn plain_triangle() -> Result<(), Error> {
    let mesh = triangle_mesh();

    let res = Writer::new(&mesh).write_to_memory()?;
    assert_eq!(res, b"\
        # Converted from PLY by ply2obj\n\
        # Vertices: 3\n\
        # Faces: 1\n\
        \n\
        v 0 0 0\n\
        v 1 0 0\n\
        v 0 1 0\n\
        \n\
        f 1 2 3\n\
        " as &[u8]
    );

    Ok(())
}

#[test]
fn per_vertex_colors() -> Result<(), Error> {
    let mut mesh = triangle_mesh();
    mesh.vertices[0].color = Some([1.0, 0.5, 0.0]);
    mesh.vertices[2].color = Some([0.0, 0.0, 1.0]);
    mesh.flags.has_colors = true;

    let res = Writer::new(&mesh).write_to_memory()?;
    assert_eq!(res, b"\
        # Converted from PLY by ply2obj\n\
        # Vertices: 3\n\
        # Faces: 1\n\
        # Has vertex colors (appended to 'v' lines as r g b)\n\
        \n\
        v 0 0 0 1 0.5 0\n\
        v 1 0 0\n\
        v 0 1 0 0 0 1\n\
        \n\
        f 1 2 3\n\
        " as &[u8]
    );

    Ok(())
}

#[test]
fn normals_with_default_for_missing() -> Result<(), Error> {
    let mut mesh = triangle_mesh();
    mesh.vertices[0].normal = Some(Vector3::new(0.0, 1.0, 0.0));
    mesh.vertices[2].normal = Some(Vector3::new(1.0, 0.0, 0.0));
    mesh.flags.has_normals = true;

    let res = Writer::new(&mesh).write_to_memory()?;
    assert_eq!(res, b"\
        # Converted from PLY by ply2obj\n\
        # Vertices: 3\n\
        # Faces: 1\n\
        # Has normals\n\
        \n\
        v 0 0 0\n\
        v 1 0 0\n\
        v 0 1 0\n\
        \n\
        vn 0 1 0\n\
        vn 0 0 1\n\
        vn 1 0 0\n\
        \n\
        f 1//1 2//2 3//3\n\
        " as &[u8]
    );

    Ok(())
}

#[test]
fn tex_coords_and_normals() -> Result<(), Error> {
    let mut mesh = triangle_mesh();
    for (i, v) in mesh.vertices.iter_mut().enumerate() {
        v.normal = Some(Vector3::new(0.0, 0.0, 1.0));
        v.tex_coord = Some(Point2::new(0.25 * i as f32, 0.5));
    }
    mesh.flags.has_normals = true;
    mesh.flags.has_tex_coords = true;

    let res = Writer::new(&mesh).write_to_memory()?;
    assert_eq!(res, b"\
        # Converted from PLY by ply2obj\n\
        # Vertices: 3\n\
        # Faces: 1\n\
        # Has normals\n\
        # Has texture coordinates\n\
        \n\
        v 0 0 0\n\
        v 1 0 0\n\
        v 0 1 0\n\
        \n\
        vt 0 0.5\n\
        vt 0.25 0.5\n\
        vt 0.5 0.5\n\
        \n\
        vn 0 0 1\n\
        vn 0 0 1\n\
        vn 0 0 1\n\
        \n\
        f 1/1/1 2/2/2 3/3/3\n\
        " as &[u8]
    );

    Ok(())
}

#[test]
fn tex_coords_only() -> Result<(), Error> {
    let mut mesh = triangle_mesh();
    mesh.vertices[1].tex_coord = Some(Point2::new(1.0, 0.0));
    mesh.flags.has_tex_coords = true;

    let res = Writer::new(&mesh).write_to_memory()?;
    assert_eq!(res, b"\
        # Converted from PLY by ply2obj\n\
        # Vertices: 3\n\
        # Faces: 1\n\
        # Has texture coordinates\n\
        \n\
        v 0 0 0\n\
        v 1 0 0\n\
        v 0 1 0\n\
        \n\
        vt 0 0\n\
        vt 1 0\n\
        vt 0 0\n\
        \n\
        f 1/1 2/2 3/3\n\
        " as &[u8]
    );

    Ok(())
}
