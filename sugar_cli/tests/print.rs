use assert_cmd::Command;
use rstest::rstest;
use sugar_core::AnyEmptyResult;

#[rstest]
#[case::snippet_with_slots(
	"<snippet:test>\n  <slot>Default</slot>\n</snippet:test>\n",
	"<?php snippet('test', slots: true); ?>\n  <?php slot(); ?>Default<?php endslot(); \
	 ?>\n<?php endsnippet(/* test */); ?>\n"
)]
#[case::self_closing_snippet("<snippet:test />\n", "<?php snippet('test'); ?>\n")]
#[case::css_variables(
	"<div --a=\"1rem\" --b=\"--ref\"></div>\n",
	"<div style=\"--a: 1rem; --b: var(--ref)\"></div>\n"
)]
#[case::pass_through("<div class=\"plain\"></div>\n", "<div class=\"plain\"></div>\n")]
fn print_writes_the_compiled_template_to_stdout(
	#[case] template: &str,
	#[case] expected: &str,
) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("page.kirby"), template)?;

	let mut cmd = Command::cargo_bin("sugar")?;
	cmd.env("NO_COLOR", "1")
		.arg("print")
		.arg("page.kirby")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(expected.to_string());

	Ok(())
}

#[test]
fn print_reports_scan_errors_with_a_diagnostic() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	std::fs::write(tmp.path().join("broken.kirby"), "<?php echo 'oops';\n")?;

	let mut cmd = Command::cargo_bin("sugar")?;
	cmd.env("NO_COLOR", "1")
		.arg("print")
		.arg("broken.kirby")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("unterminated PHP block"));

	Ok(())
}

#[test]
fn print_on_a_missing_file_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = Command::cargo_bin("sugar")?;
	cmd.env("NO_COLOR", "1")
		.arg("print")
		.arg("nope.kirby")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2);

	Ok(())
}
