// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

/// Workgroup size given to a `@compute` entry point that does not declare one.
pub const DEFAULT_WORKGROUP_SIZE: [u32; 3] = [64, 1, 1];

/// Knobs of the code generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranspileOptions {
    default_workgroup_size: [u32; 3],
    header: bool,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        TranspileOptions {
            default_workgroup_size: DEFAULT_WORKGROUP_SIZE,
            header: false,
        }
    }
}

impl TranspileOptions {
    pub fn new() -> TranspileOptions {
        TranspileOptions::default()
    }

    /// Set the workgroup size used for `@compute` entry points without `@workgroup_size`.
    /// Missing dimensions are 1.
    pub fn with_default_workgroup_size(mut self, size: &[u32]) -> Self {
        let mut dims = [1; 3];
        for (dim, value) in dims.iter_mut().zip(size) {
            *dim = *value;
        }
        self.default_workgroup_size = dims;
        self
    }

    /// Emit a comment line naming the generator before the code.
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn default_workgroup_size(&self) -> [u32; 3] {
        self.default_workgroup_size
    }

    pub fn header(&self) -> bool {
        self.header
    }
}

/// Options of a whole compilation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompileOptions {
    path: Option<PathBuf>,
    transpile: TranspileOptions,
}

impl CompileOptions {
    pub fn new() -> CompileOptions {
        CompileOptions::default()
    }

    /// The path shown in diagnostics.
    pub fn with_path<T: AsRef<Path>>(mut self, path: T) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_transpile_options(mut self, options: TranspileOptions) -> Self {
        self.transpile = options;
        self
    }

    /// The display path, `<input>` if none was given.
    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or(Path::new("<input>"))
    }

    pub fn transpile_options(&self) -> &TranspileOptions {
        &self.transpile
    }
}

#[test]
fn test_partial_workgroup_size() {
    let options = TranspileOptions::new().with_default_workgroup_size(&[8, 8]);
    assert_eq!(options.default_workgroup_size(), [8, 8, 1]);
}

#[test]
fn test_default_path() {
    assert_eq!(CompileOptions::new().path(), Path::new("<input>"));
    let options = CompileOptions::new().with_path("shaders/sky.shade");
    assert_eq!(options.path(), Path::new("shaders/sky.shade"));
}
