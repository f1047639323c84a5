/// A value which can be written to a uniform, in the form the driver consumes it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Uniform {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// A 4x4 matrix in column major order.
    Mat4([f32; 16]),
}

/// Everything which implements this trait can be stored into the uniform value of a shader.
pub trait UniformValue {
    fn to_uniform(&self) -> Uniform;
}

impl UniformValue for Uniform {
    fn to_uniform(&self) -> Uniform { *self }
}

impl UniformValue for i32 {
    fn to_uniform(&self) -> Uniform { Uniform::Int(*self) }
}

impl UniformValue for f32 {
    fn to_uniform(&self) -> Uniform { Uniform::Float(*self) }
}

impl UniformValue for (f32, f32) {
    fn to_uniform(&self) -> Uniform { Uniform::Vec2([self.0, self.1]) }
}

impl UniformValue for (f32, f32, f32) {
    fn to_uniform(&self) -> Uniform { Uniform::Vec3([self.0, self.1, self.2]) }
}

impl UniformValue for (f32, f32, f32, f32) {
    fn to_uniform(&self) -> Uniform { Uniform::Vec4([self.0, self.1, self.2, self.3]) }
}

impl UniformValue for [f32; 2] {
    fn to_uniform(&self) -> Uniform { Uniform::Vec2(*self) }
}

impl UniformValue for [f32; 3] {
    fn to_uniform(&self) -> Uniform { Uniform::Vec3(*self) }
}

impl UniformValue for [f32; 4] {
    fn to_uniform(&self) -> Uniform { Uniform::Vec4(*self) }
}
