use lscript_tests::run_program;

run_program!(arithmetic, "0-arithmetic", "11.5");
run_program!(strings, "1-strings", "hello, world");
run_program!(logic, "2-logic", "ok");
run_program!(let_chain, "3-let", "123");
run_program!(closures, "4-closures", "3");
run_program!(fibonacci, "5-fibonacci", "6765");
run_program!(mutual_recursion, "6-mutual-rec", "false");
run_program!(tail_sum, "7-tail-sum", "500000500000");
run_program!(deep_sum, "8-deep-sum", "50005000", cps_only);
run_program!(printing, "9-print", "true");
