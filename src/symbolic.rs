#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedCalc::symbolic::symbolic_engine::Expr;
/// let input = "x^2.3 * ln(x + y + y^2.6)";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// let parsed_function = parsed_expression.lambdify1(&["x", "y"]);
/// println!("{}, Rust function: {}  \n", input, parsed_function(&[1.0, 2.0]));
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) turns a String expression into a symbolic expression
/// 2) differentiates and simplifies it
/// 3) turns a symbolic expression into a Rust function
/// 4) turns a symbolic expression into TeX for printing results
///# Example#
/// ```
/// use RustedCalc::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("exp(x) + ln(y)").unwrap();
/// // return vec of all arguments
/// let all = parsed_expression.all_arguments_are_variables();
/// assert_eq!(all, vec!["x".to_string(), "y".to_string()]);
/// // differentiate with respect to x and y
/// let df_dx = parsed_expression.diff("x").simplify();
/// let df_dy = parsed_expression.diff("y").simplify();
/// println!("df_dx = {}, df_dy = {}", df_dx, df_dy);
/// // TeX for the result list
/// assert_eq!(df_dx.to_tex(), "e^{x}");
/// ```
/// Example2#
/// ```
/// use RustedCalc::symbolic::symbolic_engine::Expr;
/// // the differentiation operator is part of the grammar
/// let f = Expr::parse_expression("[d^2/dx^2] x^3").unwrap();
/// let second = f.simplify();
/// assert_eq!(second.to_tex(), "6x");
/// // compile and evaluate; a missing variable is an error at call time
/// let at = second.compile().bind("x");
/// assert_eq!(at(2.0), Ok(12.0));
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
pub mod symbolic_engine_derivatives;
/// constant folding, identities, collection of like terms and factors
pub mod symbolic_simplify;
/// compile expressions into closures
pub mod symbolic_lambdify;
/// TeX output
pub mod symbolic_tex;
/// ExpressionService: the narrow interface the calculator uses
pub mod symbolic_traits;
