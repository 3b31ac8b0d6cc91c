use thiserror::Error;

use crate::ast::{
    BinaryOperator, BlockStatement, ComparisonOperator, Expression, Program, Statement,
    UnaryOperator,
};
use crate::token::Token;

type Result<T> = std::result::Result<T, ParserError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParserError {
    #[error("expected {expected}, got {got}")]
    ExpectedToken { expected: Token, got: Token },
    #[error("expected an identifier, got {0}")]
    ExpectedIdentifier(Token),
    #[error("unexpected token: {0}")]
    UnexpectedToken(Token),
    #[error("invalid numeric literal: '{0}'")]
    InvalidNumber(String),
}

/// Recursive-descent parser over the token sequence produced by the lexer.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn cur_token(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn next_token(&mut self) {
        self.pos += 1;
    }

    fn cur_token_and_advance(&mut self) -> Token {
        let token = self.cur_token().clone();
        self.next_token();
        token
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        if *self.cur_token() != expected {
            return Err(ParserError::ExpectedToken {
                expected,
                got: self.cur_token().clone(),
            });
        }
        self.next_token();
        Ok(())
    }

    fn expect_identifier(&mut self) -> Result<String> {
        if let Token::Ident(name) = self.cur_token().clone() {
            self.next_token();
            return Ok(name);
        }
        Err(ParserError::ExpectedIdentifier(self.cur_token().clone()))
    }

    pub fn parse_program(&mut self) -> Result<Program> {
        let mut statements = vec![];

        while *self.cur_token() != Token::Eof {
            statements.push(self.parse_statement()?);
        }

        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.cur_token() {
            Token::While => self.parse_while_loop(),
            Token::FDeclare => self.parse_function_declaration(),
            Token::Declare | Token::Const => self.parse_var_declaration(),
            Token::If => self.parse_if_statement(),
            Token::OpenBrace => Ok(Statement::Block(self.parse_block()?)),
            Token::Return => self.parse_return_statement(),
            _ => {
                let expression = self.parse_expression()?;
                self.expect(Token::SemiColon)?;
                Ok(Statement::Expression(expression))
            }
        }
    }

    fn parse_var_declaration(&mut self) -> Result<Statement> {
        let constant = *self.cur_token() == Token::Const;
        self.next_token();

        let name = self.expect_identifier()?;
        self.expect(Token::Assign)?;
        let value = self.parse_expression()?;
        self.expect(Token::SemiColon)?;

        Ok(Statement::VarDeclaration {
            name,
            value,
            constant,
        })
    }

    fn parse_function_declaration(&mut self) -> Result<Statement> {
        self.expect(Token::FDeclare)?;
        let name = self.expect_identifier()?;

        self.expect(Token::OpenParen)?;
        let mut parameters = vec![];
        if *self.cur_token() != Token::CloseParen {
            parameters.push(self.expect_identifier()?);
            while *self.cur_token() == Token::Comma {
                self.next_token();
                parameters.push(self.expect_identifier()?);
            }
        }
        self.expect(Token::CloseParen)?;

        let body = self.parse_block()?;

        Ok(Statement::FunctionDeclaration {
            name,
            parameters,
            body,
        })
    }

    fn parse_while_loop(&mut self) -> Result<Statement> {
        self.expect(Token::While)?;
        self.expect(Token::OpenParen)?;
        let condition = self.parse_expression()?;
        self.expect(Token::CloseParen)?;
        let body = self.parse_block()?;

        Ok(Statement::While { condition, body })
    }

    fn parse_if_statement(&mut self) -> Result<Statement> {
        self.expect(Token::If)?;
        self.expect(Token::OpenParen)?;
        let condition = self.parse_expression()?;
        self.expect(Token::CloseParen)?;
        let consequence = self.parse_block()?;

        let mut elif_branches = vec![];
        while *self.cur_token() == Token::Elif {
            self.next_token();
            self.expect(Token::OpenParen)?;
            let elif_condition = self.parse_expression()?;
            self.expect(Token::CloseParen)?;
            let elif_block = self.parse_block()?;
            elif_branches.push((elif_condition, elif_block));
        }

        let alternative = if *self.cur_token() == Token::Else {
            self.next_token();
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            consequence,
            elif_branches,
            alternative,
        })
    }

    fn parse_return_statement(&mut self) -> Result<Statement> {
        self.expect(Token::Return)?;

        let value = if *self.cur_token() == Token::SemiColon {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(Token::SemiColon)?;

        Ok(Statement::Return(value))
    }

    fn parse_block(&mut self) -> Result<BlockStatement> {
        self.expect(Token::OpenBrace)?;

        let mut statements = vec![];
        while *self.cur_token() != Token::CloseBrace {
            if *self.cur_token() == Token::Eof {
                return Err(ParserError::ExpectedToken {
                    expected: Token::CloseBrace,
                    got: Token::Eof,
                });
            }
            statements.push(self.parse_statement()?);
        }
        self.expect(Token::CloseBrace)?;

        Ok(BlockStatement { statements })
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_assignment_expression()
    }

    // Right-associative: `a = b = c` parses as `a = (b = c)`. Whether the
    // target is assignable is checked at evaluation time.
    fn parse_assignment_expression(&mut self) -> Result<Expression> {
        let left = self.parse_comparison_expression()?;

        if *self.cur_token() == Token::Assign {
            self.next_token();
            let value = self.parse_assignment_expression()?;
            return Ok(Expression::Assignment(Box::new(left), Box::new(value)));
        }

        Ok(left)
    }

    // Comparisons bind below additive terms so `1 + 2 < 4` groups as
    // `(1 + 2) < 4`.
    fn parse_comparison_expression(&mut self) -> Result<Expression> {
        let mut left = self.parse_additive_expression()?;

        while let Some(operator) = comparison_operator(self.cur_token()) {
            self.next_token();
            let right = self.parse_additive_expression()?;
            left = Expression::Comparison(Box::new(left), operator, Box::new(right));
        }

        Ok(left)
    }

    fn parse_additive_expression(&mut self) -> Result<Expression> {
        let mut left = self.parse_multiplicative_expression()?;

        loop {
            let operator = match self.cur_token() {
                Token::Plus => BinaryOperator::Plus,
                Token::Minus => BinaryOperator::Minus,
                _ => break,
            };
            self.next_token();
            let right = self.parse_multiplicative_expression()?;
            left = Expression::Binary(Box::new(left), operator, Box::new(right));
        }

        Ok(left)
    }

    fn parse_multiplicative_expression(&mut self) -> Result<Expression> {
        let mut left = self.parse_unary_expression()?;

        loop {
            let operator = match self.cur_token() {
                Token::Asterisk => BinaryOperator::Asterisk,
                Token::Slash => BinaryOperator::Slash,
                Token::Percent => BinaryOperator::Percent,
                _ => break,
            };
            self.next_token();
            let right = self.parse_unary_expression()?;
            left = Expression::Binary(Box::new(left), operator, Box::new(right));
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> Result<Expression> {
        let operator = match self.cur_token() {
            Token::Minus => UnaryOperator::Minus,
            Token::Bang => UnaryOperator::Bang,
            _ => return self.parse_postfix_expression(),
        };
        self.next_token();
        let operand = self.parse_unary_expression()?;
        Ok(Expression::Unary(operator, Box::new(operand)))
    }

    // Index suffixes chain, so `a[0][1]` reads through nested arrays.
    fn parse_postfix_expression(&mut self) -> Result<Expression> {
        let mut expression = self.parse_primary_expression()?;

        while *self.cur_token() == Token::OpenBracket {
            self.next_token();
            let index = self.parse_expression()?;
            self.expect(Token::CloseBracket)?;
            expression = Expression::Index(Box::new(expression), Box::new(index));
        }

        Ok(expression)
    }

    fn parse_primary_expression(&mut self) -> Result<Expression> {
        match self.cur_token_and_advance() {
            Token::Ident(name) => {
                if *self.cur_token() == Token::OpenParen {
                    self.next_token();
                    let arguments = self.parse_expression_list(Token::CloseParen)?;
                    return Ok(Expression::Call(
                        Box::new(Expression::Identifier(name)),
                        arguments,
                    ));
                }
                Ok(Expression::Identifier(name))
            }
            Token::Number(text) => text
                .parse()
                .map(Expression::NumberLiteral)
                .map_err(|_| ParserError::InvalidNumber(text)),
            Token::Str(text) => Ok(Expression::StringLiteral(text)),
            Token::OpenBracket => {
                let elements = self.parse_expression_list(Token::CloseBracket)?;
                Ok(Expression::ArrayLiteral(elements))
            }
            Token::OpenParen => {
                let expression = self.parse_expression()?;
                self.expect(Token::CloseParen)?;
                Ok(expression)
            }
            token => Err(ParserError::UnexpectedToken(token)),
        }
    }

    fn parse_expression_list(&mut self, end: Token) -> Result<Vec<Expression>> {
        let mut expressions = vec![];

        if *self.cur_token() != end {
            expressions.push(self.parse_expression()?);
            while *self.cur_token() == Token::Comma {
                self.next_token();
                expressions.push(self.parse_expression()?);
            }
        }
        self.expect(end)?;

        Ok(expressions)
    }
}

fn comparison_operator(token: &Token) -> Option<ComparisonOperator> {
    match token {
        Token::Eq => Some(ComparisonOperator::Eq),
        Token::Ne => Some(ComparisonOperator::Ne),
        Token::Gt => Some(ComparisonOperator::Gt),
        Token::Ge => Some(ComparisonOperator::Ge),
        Token::Lt => Some(ComparisonOperator::Lt),
        Token::Le => Some(ComparisonOperator::Le),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use crate::ast::{
        BinaryOperator, BlockStatement, ComparisonOperator, Expression, Program, Statement,
        UnaryOperator,
    };
    use crate::lexer::tokenize;
    use crate::parser::{Parser, ParserError};
    use crate::token::Token;

    fn parse_input(input: &str) -> Program {
        let tokens = tokenize(input).unwrap();
        let mut parser = Parser::new(tokens);
        parser.parse_program().unwrap()
    }

    fn parse_error(input: &str) -> ParserError {
        let tokens = tokenize(input).unwrap();
        let mut parser = Parser::new(tokens);
        parser.parse_program().unwrap_err()
    }

    fn number(value: i64) -> Expression {
        Expression::NumberLiteral(value)
    }

    fn ident(name: &str) -> Expression {
        Expression::Identifier(name.to_string())
    }

    #[test]
    fn var_declarations() {
        let program = parse_input("declare x = 5; const y = 10;");

        assert_eq!(
            program.statements,
            vec![
                Statement::VarDeclaration {
                    name: "x".to_string(),
                    value: number(5),
                    constant: false,
                },
                Statement::VarDeclaration {
                    name: "y".to_string(),
                    value: number(10),
                    constant: true,
                },
            ]
        );
    }

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        let program = parse_input("1 + 2 * 3;");

        assert_eq!(
            program.statements,
            vec![Statement::Expression(Expression::Binary(
                Box::new(number(1)),
                BinaryOperator::Plus,
                Box::new(Expression::Binary(
                    Box::new(number(2)),
                    BinaryOperator::Asterisk,
                    Box::new(number(3)),
                )),
            ))]
        );
    }

    #[test]
    fn additive_binds_tighter_than_comparison() {
        let program = parse_input("1 + 2 < 4;");

        assert_eq!(
            program.statements,
            vec![Statement::Expression(Expression::Comparison(
                Box::new(Expression::Binary(
                    Box::new(number(1)),
                    BinaryOperator::Plus,
                    Box::new(number(2)),
                )),
                ComparisonOperator::Lt,
                Box::new(number(4)),
            ))]
        );
    }

    #[test]
    fn binary_operators_are_left_associative() {
        let program = parse_input("8 - 4 - 2;");

        assert_eq!(
            program.statements,
            vec![Statement::Expression(Expression::Binary(
                Box::new(Expression::Binary(
                    Box::new(number(8)),
                    BinaryOperator::Minus,
                    Box::new(number(4)),
                )),
                BinaryOperator::Minus,
                Box::new(number(2)),
            ))]
        );
    }

    #[test]
    fn assignment_is_right_associative() {
        let program = parse_input("x = y = 3;");

        assert_eq!(
            program.statements,
            vec![Statement::Expression(Expression::Assignment(
                Box::new(ident("x")),
                Box::new(Expression::Assignment(
                    Box::new(ident("y")),
                    Box::new(number(3)),
                )),
            ))]
        );
    }

    #[test]
    fn unary_operators() {
        let program = parse_input("-x; !y;");

        assert_eq!(
            program.statements,
            vec![
                Statement::Expression(Expression::Unary(
                    UnaryOperator::Minus,
                    Box::new(ident("x")),
                )),
                Statement::Expression(Expression::Unary(UnaryOperator::Bang, Box::new(ident("y")))),
            ]
        );
    }

    #[test]
    fn parenthesized_expression_regroups() {
        let program = parse_input("(1 + 2) * 3;");

        assert_eq!(
            program.statements,
            vec![Statement::Expression(Expression::Binary(
                Box::new(Expression::Binary(
                    Box::new(number(1)),
                    BinaryOperator::Plus,
                    Box::new(number(2)),
                )),
                BinaryOperator::Asterisk,
                Box::new(number(3)),
            ))]
        );
    }

    #[test]
    fn call_with_arguments() {
        let program = parse_input("add(1, 2 * 3);");

        assert_eq!(
            program.statements,
            vec![Statement::Expression(Expression::Call(
                Box::new(ident("add")),
                vec![
                    number(1),
                    Expression::Binary(
                        Box::new(number(2)),
                        BinaryOperator::Asterisk,
                        Box::new(number(3)),
                    ),
                ],
            ))]
        );
    }

    #[test]
    fn array_literal_and_index() {
        let program = parse_input("[1, 2, 3]; a[0][1];");

        assert_eq!(
            program.statements,
            vec![
                Statement::Expression(Expression::ArrayLiteral(vec![
                    number(1),
                    number(2),
                    number(3),
                ])),
                Statement::Expression(Expression::Index(
                    Box::new(Expression::Index(Box::new(ident("a")), Box::new(number(0)))),
                    Box::new(number(1)),
                )),
            ]
        );
    }

    #[test]
    fn index_assignment_target() {
        let program = parse_input("a[1] = 9;");

        assert_eq!(
            program.statements,
            vec![Statement::Expression(Expression::Assignment(
                Box::new(Expression::Index(Box::new(ident("a")), Box::new(number(1)))),
                Box::new(number(9)),
            ))]
        );
    }

    #[test]
    fn if_elif_else_statement() {
        let program = parse_input("if (a) { 1; } elif (b) { 2; } elif (c) { 3; } else { 4; }");

        assert_eq!(
            program.statements,
            vec![Statement::If {
                condition: ident("a"),
                consequence: BlockStatement {
                    statements: vec![Statement::Expression(number(1))],
                },
                elif_branches: vec![
                    (
                        ident("b"),
                        BlockStatement {
                            statements: vec![Statement::Expression(number(2))],
                        },
                    ),
                    (
                        ident("c"),
                        BlockStatement {
                            statements: vec![Statement::Expression(number(3))],
                        },
                    ),
                ],
                alternative: Some(BlockStatement {
                    statements: vec![Statement::Expression(number(4))],
                }),
            }]
        );
    }

    #[test]
    fn while_loop() {
        let program = parse_input("while (n) { n = n - 1; }");

        assert_eq!(
            program.statements,
            vec![Statement::While {
                condition: ident("n"),
                body: BlockStatement {
                    statements: vec![Statement::Expression(Expression::Assignment(
                        Box::new(ident("n")),
                        Box::new(Expression::Binary(
                            Box::new(ident("n")),
                            BinaryOperator::Minus,
                            Box::new(number(1)),
                        )),
                    ))],
                },
            }]
        );
    }

    #[test]
    fn function_declaration() {
        let program = parse_input("fdeclare add(x, y) { return x + y; }");

        assert_eq!(
            program.statements,
            vec![Statement::FunctionDeclaration {
                name: "add".to_string(),
                parameters: vec!["x".to_string(), "y".to_string()],
                body: BlockStatement {
                    statements: vec![Statement::Return(Some(Expression::Binary(
                        Box::new(ident("x")),
                        BinaryOperator::Plus,
                        Box::new(ident("y")),
                    )))],
                },
            }]
        );
    }

    #[test]
    fn return_without_value() {
        let program = parse_input("fdeclare noop() { return; }");

        assert_eq!(
            program.statements,
            vec![Statement::FunctionDeclaration {
                name: "noop".to_string(),
                parameters: vec![],
                body: BlockStatement {
                    statements: vec![Statement::Return(None)],
                },
            }]
        );
    }

    #[test]
    fn bare_block() {
        let program = parse_input("{ 1; }");

        assert_eq!(
            program.statements,
            vec![Statement::Block(BlockStatement {
                statements: vec![Statement::Expression(number(1))],
            })]
        );
    }

    #[test]
    fn missing_semicolon_is_an_error() {
        assert_eq!(
            parse_error("1 + 2"),
            ParserError::ExpectedToken {
                expected: Token::SemiColon,
                got: Token::Eof,
            }
        );
    }

    #[test]
    fn unclosed_group_is_an_error() {
        assert_eq!(
            parse_error("(1 + 2;"),
            ParserError::ExpectedToken {
                expected: Token::CloseParen,
                got: Token::SemiColon,
            }
        );
    }

    #[test]
    fn unclosed_block_is_an_error() {
        assert_eq!(
            parse_error("{ 1;"),
            ParserError::ExpectedToken {
                expected: Token::CloseBrace,
                got: Token::Eof,
            }
        );
    }

    #[test]
    fn declaration_requires_identifier() {
        assert_eq!(
            parse_error("declare 5 = 1;"),
            ParserError::ExpectedIdentifier(Token::Number("5".to_string()))
        );
    }

    #[test]
    fn decimal_literal_is_rejected() {
        assert_eq!(
            parse_error("declare x = 1.5;"),
            ParserError::InvalidNumber("1.5".to_string())
        );
    }

    #[test]
    fn statement_cannot_start_with_operator() {
        assert_eq!(
            parse_error("* 2;"),
            ParserError::UnexpectedToken(Token::Asterisk)
        );
    }
}
