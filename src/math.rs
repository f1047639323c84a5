//! A minimal 4x4 matrix for building model-view-projection uniforms.

use std::ops::Mul;

use crate::shader::{Uniform, UniformValue};

/// A matrix which is laid out in column major format in memory, as OpenGL expects it.
/// `m[column][row]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub m: [[f32; 4]; 4],
}

impl Mat4 {
    pub fn identity() -> Mat4 {
        Mat4 {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// An orthographic projection mapping the given box to normalized device coordinates.
    pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let mut result = Mat4::identity();
        result.m[0][0] = 2.0 / (right - left);
        result.m[1][1] = 2.0 / (top - bottom);
        result.m[2][2] = -2.0 / (far - near);

        result.m[3][0] = -(right + left) / (right - left);
        result.m[3][1] = -(top + bottom) / (top - bottom);
        result.m[3][2] = -(far + near) / (far - near);
        result
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Mat4 {
        let mut result = Mat4::identity();
        result.m[3][0] = x;
        result.m[3][1] = y;
        result.m[3][2] = z;
        result
    }

    /// Transforms the point `(x, y, z, 1)`.
    pub fn transform_point(&self, x: f32, y: f32, z: f32) -> [f32; 4] {
        let v = [x, y, z, 1.0];
        let mut out = [0.0; 4];
        for row in 0..4 {
            out[row] = (0..4).map(|col| self.m[col][row] * v[col]).sum();
        }
        out
    }

    /// The 16 components in column major order.
    pub fn to_cols_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for (col, values) in self.m.iter().enumerate() {
            out[col*4..col*4 + 4].copy_from_slice(values);
        }
        out
    }
}

impl Default for Mat4 {
    fn default() -> Mat4 {
        Mat4::identity()
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, other: Mat4) -> Mat4 {
        let mut result = [[0.0; 4]; 4];
        for col in 0..4 {
            for row in 0..4 {
                result[col][row] = (0..4).map(|k| self.m[k][row] * other.m[col][k]).sum();
            }
        }
        Mat4 { m: result }
    }
}

impl UniformValue for Mat4 {
    fn to_uniform(&self) -> Uniform {
        Uniform::Mat4(self.to_cols_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ortho_maps_corners_to_ndc() {
        let proj = Mat4::ortho(0.0, 4.0, 0.0, 2.0, -1.0, 1.0);

        let min = proj.transform_point(0.0, 0.0, 0.0);
        let max = proj.transform_point(4.0, 2.0, 0.0);
        assert_eq!(&min[..2], &[-1.0, -1.0]);
        assert_eq!(&max[..2], &[1.0, 1.0]);
    }

    #[test]
    fn translation_then_projection() {
        let mvp = Mat4::ortho(-2.0, 2.0, -2.0, 2.0, -1.0, 1.0) * Mat4::translation(1.0, 0.0, 0.0);
        assert_eq!(mvp.transform_point(0.0, 0.0, 0.0), [0.5, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn identity_is_neutral() {
        let t = Mat4::translation(3.0, 4.0, 5.0);
        assert_eq!(t * Mat4::identity(), t);
        assert_eq!(Mat4::identity() * t, t);
        assert_eq!(&t.to_cols_array()[12..15], &[3.0, 4.0, 5.0]);
    }
}
