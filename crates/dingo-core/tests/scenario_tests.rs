//! End-to-end coverage of the six worked scenarios, run through
//! `DingoPipeline::transpile`/`transpile_or_diagnostic` exactly as a caller
//! outside this workspace would invoke the pipeline.

use dingo_core::DingoPipeline;

fn pipeline() -> DingoPipeline {
    DingoPipeline::new()
}

#[test]
fn scenario_a_error_propagation_with_message_and_import_injection() {
    let src = concat!(
        "package main\n",
        "\n",
        "func readData(path: string) ([]byte, error) {\n",
        "\tlet data = ReadFile(path)? \"failed: 50% complete\"\n",
        "\treturn data, nil\n",
        "}\n",
    );
    let output = pipeline().transpile(src).unwrap();
    let gen = &output.generated;

    assert!(gen.starts_with("package main"));
    assert!(gen.contains("\"os\""));
    assert!(gen.contains("\"fmt\""));
    assert!(gen.contains("func readData(path string) ([]byte, error)"));
    assert!(gen.contains("os.ReadFile(path)"));
    assert!(gen.contains(r#"fmt.Errorf("failed: 50%% complete: %w""#));
    assert!(gen.contains("var data = __tmp0"));
}

#[test]
fn scenario_b_tuple_literal_and_destructure() {
    let src = concat!(
        "package main\n",
        "\n",
        "func pair() {\n",
        "\tlet (x, y) = (10, \"hi\")\n",
        "\tuse(x, y)\n",
        "}\n",
    );
    let output = pipeline().transpile(src).unwrap();
    let gen = &output.generated;

    assert!(gen.contains("type Tuple2IntString struct"));
    assert!(gen.contains("_0 int"));
    assert!(gen.contains("_1 string"));
    assert!(gen.contains("Tuple2IntString{_0: 10, _1: \"hi\"}"));
    assert!(gen.contains("x, y := tmp._0, tmp._1"));
}

#[test]
fn scenario_c_method_declaration_is_not_rewritten() {
    let src = concat!(
        "package main\n",
        "\n",
        "func (r Result) Map(f func(any) any) Result {\n",
        "\treturn r\n",
        "}\n",
    );
    let output = pipeline().transpile(src).unwrap();
    assert!(output.generated.contains("func (r Result) Map(f func(any) any) Result"));
    assert!(!output.generated.contains("stdlib.Map"));
}

#[test]
fn scenario_d_non_exhaustive_match_reports_the_missing_arm() {
    let src = concat!(
        "package main\n",
        "\n",
        "func unwrapOrZero(res Result) int {\n",
        "\tmatch res {\n",
        "\t\tOk(x) => x,\n",
        "\t}\n",
        "}\n",
    );
    let diagnostic = pipeline().transpile_or_diagnostic(src).unwrap_err();
    assert!(diagnostic.message.contains("Non-exhaustive"));
    assert!(diagnostic.note.as_deref().unwrap_or("").contains("Err"));
}

#[test]
fn scenario_e_safe_navigation_resolves_a_single_hop_option_chain() {
    let src = concat!(
        "package main\n",
        "\n",
        "func greet(user Option_User) string {\n",
        "\tname := user?.Name ?? \"anon\"\n",
        "\treturn name\n",
        "}\n",
    );
    let output = pipeline().transpile(src).unwrap();
    let gen = &output.generated;
    assert!(gen.contains("func() Option_User"));
    assert!(gen.contains("Option_User_None()"));
    assert!(gen.contains("Option_User_Some(user.Unwrap().Name)"));
    assert!(gen.contains("type Option_User struct"));
    assert!(gen.contains("func (v Option_User) Unwrap() User"));
    assert!(!gen.contains("__NULL_COALESCE__"));
    assert!(!gen.contains("__INFER__"));
    assert!(gen.contains("func() User"));
}

/// The resolver derives the chain's element type from the root variable's
/// own declared `Option_*` type (see `resolve_safe_nav_iifes`), which is
/// exact for one hop but only an approximation for a multi-hop chain like
/// this one: the resolved type here is `Option_User`, not the final `name`
/// field's `string`. Documented as a known limitation in SPEC_FULL.md's
/// Open Questions rather than built out further, since nothing in this
/// workspace maintains a struct-field-type table to do better.
#[test]
fn safe_navigation_over_a_multi_hop_chain_resolves_to_the_roots_option_type() {
    let src = concat!(
        "package main\n",
        "\n",
        "func greet(user Option_User) string {\n",
        "\tname := user?.profile?.name ?? \"anon\"\n",
        "\treturn name\n",
        "}\n",
    );
    let output = pipeline().transpile(src).unwrap();
    let gen = &output.generated;
    assert!(gen.contains("func() Option_User"));
    assert!(gen.contains("Option_User_Some(user.Unwrap().profile.Unwrap().name)"));
}

#[test]
fn scenario_f_nested_destructuring() {
    let src = concat!(
        "package main\n",
        "\n",
        "func split() {\n",
        "\tlet ((a, b), c) = triple()\n",
        "\tuse(a, b, c)\n",
        "}\n",
    );
    let output = pipeline().transpile(src).unwrap();
    let gen = &output.generated;
    assert!(gen.contains("tmp := triple()"));
    assert!(gen.contains("tmp1 := tmp._0"));
    assert!(gen.contains("a, b := tmp1._0, tmp1._1"));
    assert!(gen.contains("c := tmp._1"));
}
