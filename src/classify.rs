use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::Category;

/// BAM suffix patterns in priority order. Several overlap (a demultiplexed
/// HiFi BAM also ends in `.bam` after a `hifi_reads` stem), so the first
/// match wins and the order here is load-bearing.
static BAM_PATTERNS: LazyLock<Vec<(Category, Regex)>> = LazyLock::new(|| {
    [
        (Category::DemultiplexBam, r"bc[0-9]{4}--bc[0-9]{4}\.bam$"),
        (Category::Subreads, r"subreads\.bam$"),
        (Category::Reads, r"\.reads\.bam$"),
        (Category::FiveMc, r"with_5mC\.bam$"),
        (Category::HifiBam, r"hifi_reads\.(bc[0-9]{4}\.)?bam$"),
    ]
    .into_iter()
    .map(|(category, pattern)| {
        let regex = Regex::new(pattern).expect("BAM pattern is a valid regex");
        (category, regex)
    })
    .collect()
});

/// How files under a genomic platform directory are grouped and classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenomicRoute {
    /// Every file belongs to the directory's category and must be mate-paired.
    Paired(Category),
    /// Each file is classified on its own name.
    PacbioHifi,
    Unsupported,
}

pub fn genomic_route(platform_dir: &str) -> GenomicRoute {
    match platform_dir {
        "arima" => GenomicRoute::Paired(Category::Arima),
        "dovetail" => GenomicRoute::Paired(Category::Dovetail),
        "10x" | "10X" => GenomicRoute::Paired(Category::TenX),
        "element" => GenomicRoute::Paired(Category::Element),
        "illumina" => GenomicRoute::Paired(Category::Illumina),
        "pacbio_hifi" => GenomicRoute::PacbioHifi,
        _ => GenomicRoute::Unsupported,
    }
}

/// Category for a genomic file, or `None` when it cannot be classified.
///
/// Paired directories classify by directory alone; grouping into mates is
/// left to [`crate::pairing`].
pub fn classify_genomic(filename: &str, platform_dir: &str) -> Option<Category> {
    match genomic_route(platform_dir) {
        GenomicRoute::Paired(category) => Some(category),
        GenomicRoute::PacbioHifi => classify_pacbio(filename),
        GenomicRoute::Unsupported => None,
    }
}

pub fn classify_pacbio(filename: &str) -> Option<Category> {
    if filename.contains("hifi_reads") && filename.ends_with(".fastq.gz") {
        return Some(Category::Fastq);
    }
    if !filename.ends_with(".bam") {
        return None;
    }
    BAM_PATTERNS
        .iter()
        .find(|(_, regex)| regex.is_match(filename))
        .map(|(category, _)| *category)
}

pub fn transcriptomic_route(platform_dir: &str) -> Option<Category> {
    match platform_dir {
        "illumina" => Some(Category::RnaSeq),
        "pacbio_hifi" => Some(Category::IsoSeq),
        _ => None,
    }
}

pub fn is_isoseq_bam(filename: &str) -> bool {
    filename.ends_with(".bam")
}

/// Movie-name prefix of a PacBio file, e.g. `m84091` for
/// `m84091_230101_hifi_reads.bam`.
pub fn instrument_serial(filename: &str) -> &str {
    let stem = filename.split('.').next().unwrap_or(filename);
    stem.split('_').next().unwrap_or(stem)
}

/// Genomic listings only consider read containers.
pub fn is_sequence_file(filename: &str) -> bool {
    filename.contains(".bam") || filename.contains(".fastq.gz")
}

/// Final path component of an object key.
pub fn basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Last directory name of a delimiter-terminated prefix, e.g. `arima` for
/// `species/X/y/genomic_data/arima/`.
pub fn prefix_dir_name(prefix: &str) -> &str {
    basename(prefix.trim_end_matches('/'))
}
