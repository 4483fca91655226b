//! Minimal Wavefront OBJ reader
//!
//! Supports `v`, `vt`, `vn` and `f` records (polygons are fan-triangulated,
//! negative indices count from the end). Everything else (groups, materials,
//! smoothing) is ignored.

use std::path::Path;

use rustc_hash::FxHashMap;

use super::mesh::{Mesh, Vertex};
use crate::assets::error::{AssetError, AssetResult};

type Corner = (usize, Option<usize>, Option<usize>);

pub(crate) fn parse(text: &str, path: &Path) -> AssetResult<Mesh> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut uvs: Vec<[f32; 2]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();

    let mut mesh = Mesh::default();
    let mut corners: FxHashMap<Corner, u32> = FxHashMap::default();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        let mut parts = line.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => positions.push(floats::<3>(&mut parts, path, line_no)?),
            "vt" => {
                let [u, v] = floats::<2>(&mut parts, path, line_no)?;
                uvs.push([u, v]);
            }
            "vn" => normals.push(floats::<3>(&mut parts, path, line_no)?),
            "f" => {
                let face: Vec<Corner> = parts
                    .map(|p| {
                        corner(
                            p,
                            (positions.len(), uvs.len(), normals.len()),
                            path,
                            line_no,
                        )
                    })
                    .collect::<AssetResult<_>>()?;
                if face.len() < 3 {
                    return Err(AssetError::parse(path, line_no, "face needs 3+ vertices"));
                }

                let mut ids = Vec::with_capacity(face.len());
                for c in face {
                    let id = *corners.entry(c).or_insert_with(|| {
                        let (p, t, n) = c;
                        mesh.vertices.push(Vertex::new(
                            positions[p],
                            n.map_or([0.0; 3], |n| normals[n]),
                            t.map_or([0.0; 2], |t| uvs[t]),
                        ));
                        (mesh.vertices.len() - 1) as u32
                    });
                    ids.push(id);
                }
                for i in 1..ids.len() - 1 {
                    mesh.indices.extend_from_slice(&[ids[0], ids[i], ids[i + 1]]);
                }
            }
            _ => {}
        }
    }

    if mesh.indices.is_empty() {
        return Err(AssetError::decode(path, "no faces in OBJ file"));
    }
    Ok(mesh)
}

fn floats<'a, const N: usize>(
    parts: &mut impl Iterator<Item = &'a str>,
    path: &Path,
    line: usize,
) -> AssetResult<[f32; N]> {
    let mut out = [0.0; N];
    for slot in &mut out {
        let token = parts
            .next()
            .ok_or_else(|| AssetError::parse(path, line, "missing component"))?;
        *slot = token
            .parse()
            .map_err(|_| AssetError::parse(path, line, format!("bad number '{token}'")))?;
    }
    Ok(out)
}

fn corner(
    token: &str,
    counts: (usize, usize, usize),
    path: &Path,
    line: usize,
) -> AssetResult<Corner> {
    let mut fields = token.split('/');
    let p = resolve(fields.next(), counts.0, path, line)?
        .ok_or_else(|| AssetError::parse(path, line, "face vertex without position"))?;
    let t = resolve(fields.next(), counts.1, path, line)?;
    let n = resolve(fields.next(), counts.2, path, line)?;
    Ok((p, t, n))
}

fn resolve(field: Option<&str>, count: usize, path: &Path, line: usize) -> AssetResult<Option<usize>> {
    let Some(field) = field.filter(|f| !f.is_empty()) else {
        return Ok(None);
    };
    let value: i64 = field
        .parse()
        .map_err(|_| AssetError::parse(path, line, format!("bad index '{field}'")))?;
    let index = match value {
        v if v > 0 => v - 1,
        v if v < 0 => count as i64 + v,
        _ => -1,
    };
    if index < 0 || index as usize >= count {
        return Err(AssetError::parse(
            path,
            line,
            format!("index {value} out of range"),
        ));
    }
    Ok(Some(index as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# a unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_quad_is_triangulated() {
        let mesh = parse(QUAD, Path::new("quad.obj")).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.vertices[2].uv, [1.0, 1.0]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_negative_indices() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let mesh = parse(text, Path::new("tri.obj")).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_out_of_range_index_reports_line() {
        let text = "v 0 0 0\nf 1 2 3\n";
        let err = parse(text, Path::new("bad.obj")).unwrap_err();
        match err {
            AssetError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_empty_file_is_decode_error() {
        let err = parse("# nothing\n", Path::new("empty.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }
}
