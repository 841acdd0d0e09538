//! Shared helpers for generator integration tests

#![allow(dead_code)]

use entity_lengths_core::compilation::Compilation;
use entity_lengths_core::config::GeneratorOptions;
use entity_lengths_generator::{GenerationOutcome, IncrementalGenerator};
use entity_lengths_languages::{link, parse_file};
use std::path::Path;
use std::sync::Arc;

pub const ASSEMBLY: &str = "App";

/// Parses and links `(path, source)` pairs into one compilation
pub fn compile(files: &[(&str, &str)]) -> Compilation {
    let parsed: Vec<_> = files
        .iter()
        .map(|(path, source)| {
            Arc::new(parse_file(Path::new(path), source).expect("Failed to parse test source"))
        })
        .collect();
    link(ASSEMBLY, &parsed)
}

/// One generator run with default options
pub fn generate(files: &[(&str, &str)]) -> GenerationOutcome {
    IncrementalGenerator::new(GeneratorOptions::default()).run(&compile(files))
}

pub const USER_ENTITY: &str = r#"
using System.ComponentModel.DataAnnotations;

namespace App.Domain;

public class User
{
    public int Id { get; set; }

    [MaxLength(50)]
    public string Name { get; set; }
}
"#;

pub const BLOG_CONFIGURATION: &str = r#"
using Microsoft.EntityFrameworkCore;
using Microsoft.EntityFrameworkCore.Metadata.Builders;
using App.Domain;

namespace App.Data;

public class BlogConfiguration : IEntityTypeConfiguration<Blog>
{
    public void Configure(EntityTypeBuilder<Blog> builder)
    {
        builder.HasKey(b => b.Id);
        builder.Property(b => b.Url).HasMaxLength(200);
    }
}
"#;

pub const BLOG_ENTITY: &str = r#"
namespace App.Domain;

public class Blog
{
    public int Id { get; set; }
    public string Url { get; set; }
}
"#;

/// A context whose `OnModelCreating` body is `body`
pub fn context_source(body: &str) -> String {
    format!(
        r#"
using Microsoft.EntityFrameworkCore;
using App.Domain;

namespace App.Data;

public class AppDbContext : DbContext
{{
    protected override void OnModelCreating(ModelBuilder modelBuilder)
    {{
{body}
    }}
}}
"#
    )
}
