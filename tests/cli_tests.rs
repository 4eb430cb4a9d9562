//! Binary-level tests for the `pangraph` command line.

use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const VCF: &str = "\
##fileformat=VCFv4.2
##contig=<ID=chr1,length=100>
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\tS2
chr1\t20\td1\tT\t<DEL>\t.\tPASS\tSVTYPE=DEL;END=30\tGT\t0/0\t0/1
chr1\t50\tv1\tC\tG\t.\tPASS\t.\tGT\t0|1\t0|0
";

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn pangraph() -> Command {
    Command::cargo_bin("pangraph").unwrap()
}

/// Convert the test VCF with a FASTA and return the output path
fn converted(dir: &TempDir) -> PathBuf {
    let vcf = write_file(dir.path(), "calls.vcf", VCF);
    let fasta = write_file(dir.path(), "ref.fa", &format!(">chr1\n{}\n", "ACGT".repeat(25)));
    let gfa = dir.path().join("graph.gfa");

    pangraph()
        .arg("convert")
        .arg(&vcf)
        .args(["-b", "ref", "-n", "2"])
        .arg("-r")
        .arg(&fasta)
        .arg("-o")
        .arg(&gfa)
        .assert()
        .success()
        .stdout(predicate::str::contains("Segments:    7"));

    gfa
}

#[test]
fn test_convert_writes_rgfa() {
    let dir = TempDir::new().unwrap();
    let gfa = converted(&dir);

    let text = std::fs::read_to_string(gfa).unwrap();
    assert!(text.starts_with("S\ts1\t"));
    assert!(text.contains("SN:Z:ref#chr1"));
    assert!(text.contains("SN:Z:S1#chr1"));
}

#[test]
fn test_convert_without_reference_json() {
    let dir = TempDir::new().unwrap();
    let vcf = write_file(dir.path(), "calls.vcf", VCF);
    let gfa = dir.path().join("graph.gfa.gz");

    pangraph()
        .args(["--format", "json", "convert"])
        .arg(&vcf)
        .args(["-b", "ref", "-o"])
        .arg(&gfa)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"segments\": 7"))
        .stdout(predicate::str::contains("\"chr1\""));

    pangraph()
        .arg("inspect")
        .arg(&gfa)
        .assert()
        .success()
        .stdout(predicate::str::contains("Backbone: ref"));
}

#[test]
fn test_convert_missing_contig_lengths_fails() {
    let dir = TempDir::new().unwrap();
    let vcf = write_file(
        dir.path(),
        "calls.vcf",
        &VCF.replace("##contig=<ID=chr1,length=100>\n", ""),
    );
    let gfa = dir.path().join("graph.gfa");

    pangraph()
        .arg("convert")
        .arg(&vcf)
        .args(["-b", "ref", "-o"])
        .arg(&gfa)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please provide a reference FASTA"));

    assert!(!gfa.exists(), "no output is written when conversion fails");
}

#[test]
fn test_convert_without_samples_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let vcf = write_file(
        dir.path(),
        "calls.vcf",
        "##contig=<ID=chr1,length=100>\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n",
    );
    let gfa = dir.path().join("graph.gfa.gz");

    pangraph()
        .arg("convert")
        .arg(&vcf)
        .args(["-b", "ref", "-o"])
        .arg(&gfa)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No sample columns found in VCF"));

    assert!(!gfa.exists());
}

#[test]
fn test_convert_fai_preflight() {
    let dir = TempDir::new().unwrap();
    let vcf = write_file(dir.path(), "calls.vcf", VCF);
    let fasta = write_file(dir.path(), "ref.fa", ">chr2\nACGT\n");
    write_file(dir.path(), "ref.fa.fai", "chr2\t4\t6\t4\t5\n");

    pangraph()
        .arg("convert")
        .arg(&vcf)
        .args(["-b", "ref", "-r"])
        .arg(&fasta)
        .arg("-o")
        .arg(dir.path().join("graph.gfa"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing in the reference: chr1"));
}

#[test]
fn test_inspect_json() {
    let dir = TempDir::new().unwrap();
    let gfa = converted(&dir);

    pangraph()
        .args(["inspect", "-f", "json"])
        .arg(&gfa)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"backbone_segments\": 5"))
        .stdout(predicate::str::contains("\"needs_normalization\": false"));
}

#[test]
fn test_subgraph_region() {
    let dir = TempDir::new().unwrap();
    let gfa = converted(&dir);

    pangraph()
        .arg("subgraph")
        .arg(&gfa)
        .args(["-c", "chr1", "-s", "1", "-e", "15", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("s1\tBB"))
        .stdout(predicate::str::contains("start\tstar"))
        .stdout(predicate::str::contains("s2\t").not());
}

#[test]
fn test_subgraph_unknown_contig() {
    let dir = TempDir::new().unwrap();
    let gfa = converted(&dir);

    pangraph()
        .arg("subgraph")
        .arg(&gfa)
        .args(["-c", "chr9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No nodes in the selected region"))
        .stdout(predicate::str::contains("Contig chr9 not found"));
}

#[test]
fn test_nodes_lookup() {
    let dir = TempDir::new().unwrap();
    let gfa = converted(&dir);

    pangraph()
        .arg("nodes")
        .arg(&gfa)
        .args(["s1", "missing"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(">s1\tNodeId: s1; Resource: ref_chr1; Len: 19"))
        .stdout(predicate::str::contains("ACGTACGTACGTACGTACG"));
}

#[test]
fn test_missing_input_fails() {
    pangraph()
        .args(["inspect", "/nonexistent/graph.gfa"])
        .assert()
        .failure();
}

#[test]
fn test_subgraph_node_set() {
    let dir = TempDir::new().unwrap();
    let gfa = converted(&dir);

    pangraph()
        .arg("subgraph")
        .arg(&gfa)
        .args(["-i", "s1", "-i", "s6", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"selection\": \"s1,s6\""))
        .stdout(predicate::str::contains("\"id\": \"s6\""));
}

#[test]
fn test_merge_offsets_second_graph() {
    let dir = TempDir::new().unwrap();
    let gfa = converted(&dir);
    let merged = dir.path().join("merged.gfa");

    pangraph()
        .arg("merge")
        .arg(&gfa)
        .arg(&gfa)
        .arg("-o")
        .arg(&merged)
        .assert()
        .success()
        .stdout(predicate::str::contains("Segments:    14"));

    let text = std::fs::read_to_string(&merged).unwrap();
    assert!(text.contains("S\ts8\t"));
    assert!(text.contains("S\ts14\t"));
    assert!(!text.contains("S\ts15\t"));

    pangraph().arg("inspect").arg(&merged).assert().success();
}

#[test]
fn test_export_sv_converts_again() {
    let dir = TempDir::new().unwrap();
    let gfa = converted(&dir);
    let exported = dir.path().join("exported.vcf");

    pangraph()
        .arg("export-sv")
        .arg(&gfa)
        .args(["-b", "ref", "-o"])
        .arg(&exported)
        .assert()
        .success()
        .stdout(predicate::str::contains("Variants:    2"))
        .stdout(predicate::str::contains("Samples:     S1, S2"));

    let text = std::fs::read_to_string(&exported).unwrap();
    assert!(text.contains("##contig=<ID=chr1,length=100>"));
    assert!(text.contains("chr1\t20\td1\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;SVLEN=10;END=30\tGT\t0/0\t0/1\n"));
    assert!(text.contains("chr1\t50\tv1\tC\tG\t.\tPASS\tSVTYPE=SNP;SVLEN=1;END=51\tGT\t0/1\t0/0\n"));

    pangraph()
        .arg("convert")
        .arg(&exported)
        .args(["-b", "ref", "-o"])
        .arg(dir.path().join("again.gfa"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Segments:    7"));
}

#[test]
fn test_export_sv_region_filter() {
    let dir = TempDir::new().unwrap();
    let gfa = converted(&dir);
    let bed = write_file(dir.path(), "targets.bed", "chr1\t45\t55\n");

    pangraph()
        .args(["--format", "tsv", "export-sv"])
        .arg(&gfa)
        .arg("-R")
        .arg(&bed)
        .arg("-o")
        .arg(dir.path().join("subset.vcf.gz"))
        .assert()
        .success()
        .stdout(predicate::str::contains("chr1\t50\tv1\tSNP"))
        .stdout(predicate::str::contains("d1").not());
}

#[test]
fn test_remove_backbone() {
    let dir = TempDir::new().unwrap();
    let gfa = converted(&dir);
    let output = dir.path().join("removed.gfa");

    pangraph()
        .arg("remove-backbone")
        .arg(&gfa)
        .args(["-b", "ref", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Remaining:   0 segments, 0 links"));

    pangraph()
        .arg("remove-backbone")
        .arg(&gfa)
        .args(["-b", "other", "-o"])
        .arg(dir.path().join("unchanged.gfa"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Backbone other not found"));
}
