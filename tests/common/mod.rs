//! Shared test constants and helpers for integration tests.

#![allow(dead_code)]

use std::io::Write;

use tempfile::NamedTempFile;

/// Bibliography with one entry of each recognised kind plus a closing brace
/// on the key line, a field containing underscores and an ignored entry type.
pub const BIB: &str = r#"% Test bibliography
@article{smith_widgets_2016,
  author = {Smith, John and Doe, Jane},
  title = {Widgets and_their_uses},
  year = {2016}
}

@inproceedings{jones_gadgets_2012,
  author = {Jones, Alice},
  year = {2012}
}

@incollection{brown_survey_1999,
  year = {1999}
}

@book{lee_handbook_2005,
}

@misc{obrien_dataset_2020}

@techreport{garcia_methods_2018,
}

@phdthesis{ignored_thesis_2001,
}
"#;

/// Helper to create a temporary file with content
pub fn create_temp_file(content: &str, extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(extension)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
