//! Integration tests for YAML parsing

mod common;

use runbook::config::{parse_config, parse_config_file, validate_config, Dependency, Step};

#[test]
fn test_parse_complete_config() {
    let yaml = r#"
name: lang
usage: Build and run programs
dotenv: true
default: build

variables:
  root: .
  src_dir: "${root}/examples"
  build_dir: "${root}/build"

tasks:
  build:
    usage: Compile, assemble and link a program
    params:
      - name: name
        default: hello
        usage: Program to build
    run:
      - compiler ${src_dir}/${name}.lang ${build_dir}/${name}.asm
      - nasm -f elf64 runtime/print.asm -o ${build_dir}/print.o
      - nasm -f elf64 ${build_dir}/${name}.asm -o ${build_dir}/${name}.o
      - ld ${build_dir}/print.o ${build_dir}/${name}.o -o ${build_dir}/${name}

  run:
    usage: Build and run a program
    params: [name]
    deps:
      - task: build
        args: ["${name}"]
    run: ${build_dir}/${name}

  clean:
    usage: Remove build artifacts
    run:
      - clean:
          dir: ${build_dir}
          keep: .gitignore
"#;

    let config = parse_config(yaml).unwrap();
    validate_config(&config).unwrap();

    assert_eq!(config.name.as_deref(), Some("lang"));
    assert!(config.dotenv);
    assert_eq!(config.variables.len(), 3);
    assert_eq!(config.tasks.len(), 3);

    let build = config.tasks.get("build").unwrap();
    assert_eq!(build.run.len(), 4);
    assert_eq!(build.params[0].default(), Some("hello"));

    let run = config.tasks.get("run").unwrap();
    assert!(matches!(&run.deps[0], Dependency::Detailed(d) if d.task == "build"));

    let clean = config.tasks.get("clean").unwrap();
    assert!(matches!(&clean.run[0], Step::Clean { .. }));
}

#[test]
fn test_parse_quiet_and_private() {
    let yaml = r#"
tasks:
  public:
    usage: Public task
    run: echo "public"

  private:
    usage: Private task
    private: true
    run: echo "private"

  quiet:
    usage: Quiet task
    quiet: true
    run: echo "quiet"
"#;

    let config = parse_config(yaml).unwrap();
    validate_config(&config).unwrap();

    assert!(!config.tasks.get("public").unwrap().private);
    assert!(config.tasks.get("private").unwrap().private);
    assert!(config.tasks.get("quiet").unwrap().quiet);
}

#[test]
fn test_parse_from_file() {
    let yaml = r#"
tasks:
  hello:
    run: echo "Hello from file"
"#;

    let (_temp_dir, config_path) = common::create_test_config(yaml);
    let config = parse_config_file(&config_path).unwrap();

    validate_config(&config).unwrap();
    assert!(config.tasks.contains_key("hello"));
}

#[test]
fn test_invalid_config_undefined_variable() {
    let yaml = r#"
tasks:
  bad:
    run: echo ${nowhere}
"#;

    let config = parse_config(yaml).unwrap();
    let err = validate_config(&config).unwrap_err();
    assert!(err.to_string().contains("nowhere"));
}

#[test]
fn test_invalid_step_shape() {
    let yaml = r#"
tasks:
  bad:
    run:
      - unknown: thing
"#;

    assert!(parse_config(yaml).is_err());
}
